use chrono::{Datelike, NaiveDate};

use super::{LunarConverter, LunarError};
use crate::locale::Locale;

const FIRST_YEAR: i32 = 1900;
const LAST_YEAR: i32 = 2100;

/// One entry per lunar year from 1900 to 2100.
///
/// Bits 0-3: leap month number (0 for none). Bits 4-15: month 12 down to
/// month 1, set when the month has 30 days. Bit 16: set when the leap month
/// has 30 days.
const YEAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520, // 2100
];

const STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const MONTHS: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];
const MONTHS_TRADITIONAL: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "臘",
];
const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

fn info(year: i32) -> u32 {
    YEAR_INFO[(year - FIRST_YEAR) as usize]
}

fn leap_month(year: i32) -> u32 {
    info(year) & 0xf
}

fn leap_month_days(year: i32) -> i64 {
    match leap_month(year) {
        0 => 0,
        _ if info(year) & 0x10000 != 0 => 30,
        _ => 29,
    }
}

fn month_days(year: i32, month: u32) -> i64 {
    if info(year) & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(year: i32) -> i64 {
    (1..=12).map(|m| month_days(year, m)).sum::<i64>() + leap_month_days(year)
}

fn epoch() -> NaiveDate {
    // Lunar 1900, first day of the first month.
    NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 31).expect("valid lunar epoch")
}

/// A day of the Chinese lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarDate {
    /// Gregorian number of the lunar year this day belongs to.
    pub year: i32,
    /// 1-based lunar month.
    pub month: u32,
    /// True inside the intercalary copy of `month`.
    pub leap: bool,
    /// 1-based day of the lunar month.
    pub day: u32,
}

impl LunarDate {
    pub fn from_solar(date: NaiveDate) -> Result<Self, LunarError> {
        let mut offset = date.signed_duration_since(epoch()).num_days();
        if offset < 0 {
            return Err(LunarError::OutOfRange(date));
        }

        let mut year = FIRST_YEAR;
        loop {
            if year > LAST_YEAR {
                return Err(LunarError::OutOfRange(date));
            }
            let days = year_days(year);
            if offset < days {
                break;
            }
            offset -= days;
            year += 1;
        }

        let leap = leap_month(year);
        let mut month = 1;
        loop {
            let days = month_days(year, month);
            if offset < days {
                return Ok(Self::at(year, month, false, offset));
            }
            offset -= days;

            if month == leap {
                let days = leap_month_days(year);
                if offset < days {
                    return Ok(Self::at(year, month, true, offset));
                }
                offset -= days;
            }
            month += 1;
        }
    }

    fn at(year: i32, month: u32, leap: bool, offset: i64) -> Self {
        Self {
            year,
            month,
            leap,
            day: offset as u32 + 1,
        }
    }

    /// Sexagenary name of the year, e.g. `辛丑` for 2021.
    pub fn ganzhi(&self) -> String {
        let cycle = (self.year - 4).rem_euclid(60) as usize;
        format!("{}{}", STEMS[cycle % 10], BRANCHES[cycle % 12])
    }

    pub fn month_name(&self, traditional: bool) -> String {
        let names = if traditional {
            &MONTHS_TRADITIONAL
        } else {
            &MONTHS
        };
        let leap = match (self.leap, traditional) {
            (false, _) => "",
            (true, false) => "闰",
            (true, true) => "閏",
        };
        format!("{}{}月", leap, names[(self.month - 1) as usize])
    }

    pub fn day_name(&self) -> String {
        let tens = self.day / 10;
        let ones = (self.day % 10) as usize;
        match (tens, ones) {
            (0, _) => format!("初{}", DIGITS[ones]),
            (1, 0) => "初十".to_string(),
            (1, _) => format!("十{}", DIGITS[ones]),
            (2, 0) => "二十".to_string(),
            (2, _) => format!("廿{}", DIGITS[ones]),
            _ => "三十".to_string(),
        }
    }
}

/// Table-driven converter covering lunar years 1900 through 2100.
///
/// Output looks like `辛丑年 二月初三`; the year and the separating space
/// form the four-character prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChineseLunarCalendar;

impl LunarConverter for ChineseLunarCalendar {
    fn convert(&self, date: NaiveDate, locale: &Locale) -> Result<String, LunarError> {
        let lunar = LunarDate::from_solar(date)?;
        let traditional = locale.uses_traditional_script();
        log::debug!(
            "Lunar conversion {}-{}-{} -> {:?}",
            date.year(),
            date.month(),
            date.day(),
            lunar
        );
        Ok(format!(
            "{}年 {}{}",
            lunar.ganzhi(),
            lunar.month_name(traditional),
            lunar.day_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lunar(y: i32, m: u32, d: u32) -> LunarDate {
        LunarDate::from_solar(ymd(y, m, d)).unwrap()
    }

    #[test]
    fn new_year_days() {
        for (y, m, d) in [(2000, 2, 5), (2021, 2, 12), (2024, 2, 10), (2025, 1, 29)] {
            let date = lunar(y, m, d);
            assert_eq!((date.year, date.month, date.leap, date.day), (y, 1, false, 1));
        }
    }

    #[test]
    fn day_before_new_year_belongs_to_previous_year() {
        let date = lunar(2024, 2, 9);
        assert_eq!((date.year, date.month, date.day), (2023, 12, 30));
        assert_eq!(date.ganzhi(), "癸卯");
    }

    #[test]
    fn leap_months() {
        let date = lunar(2023, 3, 22);
        assert_eq!((date.month, date.leap, date.day), (2, true, 1));
        let date = lunar(2023, 4, 20);
        assert_eq!((date.month, date.leap, date.day), (3, false, 1));
        let date = lunar(2020, 5, 23);
        assert_eq!((date.month, date.leap, date.day), (4, true, 1));
    }

    #[test]
    fn mid_autumn_2025() {
        let date = lunar(2025, 10, 6);
        assert_eq!((date.month, date.day), (8, 15));
        assert_eq!(date.day_name(), "十五");
    }

    #[test]
    fn range_limits() {
        assert_eq!(lunar(1900, 1, 31).day, 1);
        assert!(LunarDate::from_solar(ymd(1900, 1, 30)).is_err());
        assert!(LunarDate::from_solar(ymd(2100, 12, 31)).is_ok());
        assert_eq!(
            LunarDate::from_solar(ymd(2101, 6, 1)),
            Err(LunarError::OutOfRange(ymd(2101, 6, 1)))
        );
    }

    #[test]
    fn day_names() {
        let name = |day| {
            LunarDate {
                year: 2021,
                month: 1,
                leap: false,
                day,
            }
            .day_name()
        };
        assert_eq!(name(1), "初一");
        assert_eq!(name(10), "初十");
        assert_eq!(name(11), "十一");
        assert_eq!(name(20), "二十");
        assert_eq!(name(21), "廿一");
        assert_eq!(name(30), "三十");
    }

    #[test]
    fn converter_output_carries_prefix() {
        let cn = ChineseLunarCalendar
            .convert(ymd(2021, 3, 15), &Locale::new("zh", "CN"))
            .unwrap();
        assert_eq!(cn, "辛丑年 二月初三");

        let tw = ChineseLunarCalendar
            .convert(ymd(2024, 2, 9), &Locale::new("zh", "TW"))
            .unwrap();
        assert_eq!(tw, "癸卯年 臘月三十");

        let leap = ChineseLunarCalendar
            .convert(ymd(2023, 3, 22), &Locale::new("zh", "CN"))
            .unwrap();
        assert_eq!(leap, "癸卯年 闰二月初一");
    }
}
