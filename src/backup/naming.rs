use chrono::{DateTime, NaiveDateTime, TimeZone};

pub const DEFAULT_PREFIX: &str = "quick-money";
const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M";
const BACKUP_EXTENSION: &str = ".json";
/// `YYYYMMDD-HHmm`
const NAME_TIMESTAMP_WIDTH: usize = 13;

/// `<prefix>-backup-YYYYMMDD-HHmm.json`, stamped with the given wall-clock time.
pub fn backup_file_name<Tz>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}-backup-{}{}",
        prefix,
        at.format(NAME_TIMESTAMP_FORMAT),
        BACKUP_EXTENSION
    )
}

/// Only names carrying a parseable `YYYYMMDD-HHmm` stamp qualify, so
/// descending string order stays chronological.
pub fn is_backup_file_name(prefix: &str, name: &str) -> bool {
    let stamp = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix("-backup-"))
        .and_then(|rest| rest.strip_suffix(BACKUP_EXTENSION));
    match stamp {
        Some(stamp) if stamp.len() == NAME_TIMESTAMP_WIDTH => {
            stamp.bytes().all(|b| b.is_ascii_digit() || b == b'-')
                && NaiveDateTime::parse_from_str(stamp, NAME_TIMESTAMP_FORMAT).is_ok()
        }
        _ => false,
    }
}

/// The fixed-width timestamp makes descending string order newest-first.
pub fn sort_newest_first(names: &mut [String]) {
    names.sort_by(|a, b| b.cmp(a));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};

    #[test]
    fn name_pads_every_component() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        assert_eq!(
            backup_file_name(DEFAULT_PREFIX, &at),
            "quick-money-backup-20250307-0905.json"
        );
    }

    #[test]
    fn filters_foreign_files() {
        assert!(is_backup_file_name("quick-money", "quick-money-backup-20250101-0000.json"));
        assert!(!is_backup_file_name("quick-money", "notes.json"));
        assert!(!is_backup_file_name("quick-money", "quick-money-backup-20250101-0000.txt"));
    }

    #[test]
    fn rejects_names_without_a_valid_stamp() {
        for name in [
            "quick-money-backup-manual-copy.json",
            "quick-money-backup-20250101-0000-old.json",
            "quick-money-backup-2025011-00000.json",
            "quick-money-backup-20251301-0000.json",
            "quick-money-backup-20250101-2460.json",
            "other-backup-20250101-0000.json",
        ] {
            assert!(!is_backup_file_name("quick-money", name), "{name}");
        }
    }

    #[test]
    fn newest_sorts_first() {
        let mut names = vec![
            "quick-money-backup-20250101-0900.json".to_string(),
            "quick-money-backup-20250301-0800.json".to_string(),
            "quick-money-backup-20250101-1000.json".to_string(),
        ];
        sort_newest_first(&mut names);
        assert_eq!(names[0], "quick-money-backup-20250301-0800.json");
        assert_eq!(names[2], "quick-money-backup-20250101-0900.json");
    }
}
