use std::fmt;

use serde::{Deserialize, Serialize};

/// A single fitness entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Caller assigned primary key.
    pub id: i32,
    pub full_name: String,
    pub age: i32,
    pub weight: f64,
    pub steps_today: i32,
    pub calories_burned: f64,
}

impl Record {
    pub fn new(
        id: i32,
        full_name: impl Into<String>,
        age: i32,
        weight: f64,
        steps_today: i32,
        calories_burned: f64,
    ) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            age,
            weight,
            steps_today,
            calories_burned,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Name: {} | Age: {} | Weight: {} | Steps: {} | Calories: {}",
            self.id,
            self.full_name,
            self.age,
            HalfUp(self.weight, 1),
            self.steps_today,
            HalfUp(self.calories_burned, 2)
        )
    }
}

/// Fixed point rendering of a float that rounds half up on its shortest
/// decimal representation, so `0.125` with two places is `0.13`.
#[derive(Debug, Clone, Copy)]
pub struct HalfUp(pub f64, pub usize);

impl fmt::Display for HalfUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let HalfUp(value, places) = *self;
        if !value.is_finite() {
            return write!(f, "{}", value);
        }

        // `{}` never uses exponent notation for f64.
        let shortest = format!("{}", value.abs());
        let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

        let mut digits: Vec<u8> = int_part.bytes().collect();
        digits.extend(frac_part.bytes().chain(std::iter::repeat(b'0')).take(places));

        if frac_part.as_bytes().get(places).is_some_and(|d| *d >= b'5') {
            let mut carried = true;
            for digit in digits.iter_mut().rev() {
                if *digit == b'9' {
                    *digit = b'0';
                } else {
                    *digit += 1;
                    carried = false;
                    break;
                }
            }
            if carried {
                digits.insert(0, b'1');
            }
        }

        let split = digits.len() - places;
        if value.is_sign_negative() {
            f.write_str("-")?;
        }
        // Only ASCII digits were pushed above.
        f.write_str(std::str::from_utf8(&digits[..split]).map_err(|_| fmt::Error)?)?;
        if places > 0 {
            f.write_str(".")?;
            f.write_str(std::str::from_utf8(&digits[split..]).map_err(|_| fmt::Error)?)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rounds_measurements() {
        let record = Record::new(7, "Jane Doe", 31, 142.26, 9500, 310.456);

        assert_eq!(
            record.to_string(),
            "ID: 7 | Name: Jane Doe | Age: 31 | Weight: 142.3 | Steps: 9500 | Calories: 310.46"
        );
    }

    #[test]
    fn display_rounds_ties_up() {
        let record = Record::new(2, "B", 30, 150.25, 1000, 310.455);

        assert_eq!(
            record.to_string(),
            "ID: 2 | Name: B | Age: 30 | Weight: 150.3 | Steps: 1000 | Calories: 310.46"
        );
    }

    #[test]
    fn half_up_formatting() {
        let cases = [
            (150.25, 1, "150.3"),
            (150.15, 1, "150.2"),
            (0.125, 2, "0.13"),
            (310.455, 2, "310.46"),
            (200.0, 2, "200.00"),
            (9.96, 1, "10.0"),
            (999.995, 2, "1000.00"),
            (-1.25, 1, "-1.3"),
            (0.0000001, 1, "0.0"),
            (2.5, 0, "3"),
            (1.04, 1, "1.0"),
        ];

        for (value, places, expected) in cases {
            assert_eq!(HalfUp(value, places).to_string(), expected, "{}", value);
        }
    }
}
