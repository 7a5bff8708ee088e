//! Semester 타입
//!
//! SALT의 관측 학기는 `YYYY-N` 형식입니다 (예: `2021-2`).
//!
//! - 1학기: 5월 1일 12:00 UTC 시작
//! - 2학기: 11월 1일 12:00 UTC 시작, 다음 해 5월 1일 12:00 UTC 종료

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static SEMESTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(20\d{2})-([12])$").expect("valid semester regex"));

/// 관측 학기
///
/// `(year, half)` 순서로 비교되므로 파생된 `Ord`가 시작 시각 순서와 일치합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semester {
    year: i32,
    half: u8,
}

impl Semester {
    /// 지원하는 가장 이른 학기
    pub const EARLIEST: Semester = Semester { year: 2000, half: 1 };

    /// 지원하는 가장 늦은 학기
    pub const LATEST: Semester = Semester { year: 2099, half: 2 };

    /// 새 학기 생성
    pub fn new(year: i32, half: u8) -> Result<Self> {
        if !(2000..=2099).contains(&year) || !(1..=2).contains(&half) {
            return Err(Error::validation(format!(
                "Invalid semester: {}-{}. The year must be between 2000 and 2099 and the semester must be 1 or 2.",
                year, half
            )));
        }
        Ok(Self { year, half })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn half(&self) -> u8 {
        self.half
    }

    /// 학기 시작 시각 (UTC)
    pub fn start(&self) -> DateTime<Utc> {
        let month = if self.half == 1 { 5 } else { 11 };
        noon_utc(self.year, month)
    }

    /// 학기 종료 시각 (UTC, 다음 학기 시작과 동일)
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }

    /// 다음 학기
    pub fn next(&self) -> Self {
        if self.half == 1 {
            Self {
                year: self.year,
                half: 2,
            }
        } else {
            Self {
                year: self.year + 1,
                half: 1,
            }
        }
    }

    /// 주어진 시각이 속한 학기
    ///
    /// 경계가 정오이므로 12시간을 당긴 뒤 월로 판정합니다.
    pub fn of_datetime(t: DateTime<Utc>) -> Self {
        let shifted = t - Duration::hours(12);
        let (year, half) = match shifted.month() {
            1..=4 => (shifted.year() - 1, 2),
            5..=10 => (shifted.year(), 1),
            _ => (shifted.year(), 2),
        };
        Self { year, half }
    }
}

fn noon_utc(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
}

impl FromStr for Semester {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = SEMESTER_PATTERN.captures(s).ok_or_else(|| {
            Error::validation(format!(
                "Invalid semester: {:?}. A semester must be of the form YYYY-N, such as 2021-2.",
                s
            ))
        })?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| Error::validation(format!("Invalid semester year: {:?}", s)))?;
        let half: u8 = caps[2]
            .parse()
            .map_err(|_| Error::validation(format!("Invalid semester number: {:?}", s)))?;
        Semester::new(year, half)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.half)
    }
}

impl Serialize for Semester {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Semester {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// 학기 범위 (양 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemesterRange {
    pub from: Semester,
    pub to: Semester,
}

impl SemesterRange {
    /// 범위 생성
    ///
    /// `from`이 `to`보다 늦으면 형식 오류가 아닌 의미 오류(`BadRequest`)입니다.
    pub fn new(from: Semester, to: Semester) -> Result<Self> {
        if from.start() > to.start() {
            return Err(Error::BadRequest {
                message: "The from semester must not be later than the to semester.".to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// 학기가 범위에 포함되는지 확인
    pub fn contains(&self, semester: &Semester) -> bool {
        self.from <= *semester && *semester <= self.to
    }
}
