/// Formats seconds as `m:ss`. Unknown or negative times render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0. {
        return "0:00".to_string();
    }

    let minutes = (seconds / 60.).floor() as u64;
    let seconds = (seconds % 60.).floor() as u64;

    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(61.), "1:01");
        assert_eq!(format_time(3600.), "60:00");
        assert_eq!(format_time(-1.), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
