use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// A parsed index value, normalized to a timezone-free UTC wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    /// Carried an offset; converted to UTC and the offset dropped.
    Aware(PrimitiveDateTime),
    Naive(PrimitiveDateTime),
}

impl ParsedTimestamp {
    pub fn value(self) -> PrimitiveDateTime {
        match self {
            Self::Aware(ts) | Self::Naive(ts) => ts,
        }
    }

    pub fn is_aware(self) -> bool {
        matches!(self, Self::Aware(_))
    }
}

fn strip_offset(ts: OffsetDateTime) -> PrimitiveDateTime {
    let utc = ts.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub fn parse_timestamp(raw: &str) -> Result<ParsedTimestamp, String> {
    let s = raw.trim();

    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(ParsedTimestamp::Aware(strip_offset(ts)));
    }

    let with_offset = [
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ];
    if let Some(ts) = with_offset
        .iter()
        .find_map(|fmt| OffsetDateTime::parse(s, fmt).ok())
    {
        return Ok(ParsedTimestamp::Aware(strip_offset(ts)));
    }

    let naive = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    if let Some(ts) = naive
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(s, fmt).ok())
    {
        return Ok(ParsedTimestamp::Naive(ts));
    }

    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map(|d| ParsedTimestamp::Naive(d.midnight()))
        .map_err(|_| format!("unrecognized timestamp '{s}'"))
}
