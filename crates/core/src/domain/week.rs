use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Monday-first display order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One value per weekday. Every constructor populates all seven entries, so a
/// `WeekdayMap` can never be missing a day; days absent from serialized input
/// take `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekdayMap<T> {
    #[serde(default)]
    pub monday: T,
    #[serde(default)]
    pub tuesday: T,
    #[serde(default)]
    pub wednesday: T,
    #[serde(default)]
    pub thursday: T,
    #[serde(default)]
    pub friday: T,
    #[serde(default)]
    pub saturday: T,
    #[serde(default)]
    pub sunday: T,
}

/// Final per-weekday production quantities.
pub type DayPlan = WeekdayMap<u64>;

/// Normalized traffic fractions; the seven values sum to 1.0.
pub type Weights = WeekdayMap<f64>;

impl<T> WeekdayMap<T> {
    pub fn from_fn(mut f: impl FnMut(Weekday) -> T) -> Self {
        Self {
            monday: f(Weekday::Mon),
            tuesday: f(Weekday::Tue),
            wednesday: f(Weekday::Wed),
            thursday: f(Weekday::Thu),
            friday: f(Weekday::Fri),
            saturday: f(Weekday::Sat),
            sunday: f(Weekday::Sun),
        }
    }

    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(|_| value.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &T)> + '_ {
        WEEK.iter().map(move |&day| (day, &self[day]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Weekday, &T) -> U) -> WeekdayMap<U> {
        WeekdayMap::from_fn(|day| f(day, &self[day]))
    }
}

impl WeekdayMap<u64> {
    /// Saturates instead of overflowing on huge manual quantities.
    pub fn total(&self) -> u64 {
        self.iter().fold(0, |acc, (_, q)| acc.saturating_add(*q))
    }
}

impl WeekdayMap<f64> {
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

impl<T> Index<Weekday> for WeekdayMap<T> {
    type Output = T;

    fn index(&self, day: Weekday) -> &T {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

impl<T> IndexMut<Weekday> for WeekdayMap<T> {
    fn index_mut(&mut self, day: Weekday) -> &mut T {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Accepts English full or short names and French names, case-insensitive.
pub fn parse_weekday_label(s: &str) -> Option<Weekday> {
    let lower = s.trim().to_lowercase();
    let day = match lower.as_str() {
        "monday" | "mon" | "lundi" => Weekday::Mon,
        "tuesday" | "tue" | "mardi" => Weekday::Tue,
        "wednesday" | "wed" | "mercredi" => Weekday::Wed,
        "thursday" | "thu" | "jeudi" => Weekday::Thu,
        "friday" | "fri" | "vendredi" => Weekday::Fri,
        "saturday" | "sat" | "samedi" => Weekday::Sat,
        "sunday" | "sun" | "dimanche" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Serde adapter writing lowercase English labels and reading any label
/// `parse_weekday_label` understands.
pub mod serde_label {
    use super::{parse_weekday_label, weekday_label};
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_label(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_weekday_label(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday label: {s}")))
    }
}

/// Same as [`serde_label`] for optional weekdays.
pub mod serde_label_opt {
    use super::{parse_weekday_label, weekday_label};
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Option<Weekday>, serializer: S) -> Result<S::Ok, S::Error> {
        match day {
            Some(d) => serializer.serialize_some(weekday_label(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Weekday>, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse_weekday_label(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday label: {s}")))
    }
}
