//! Gesture batches
//!
//! A batch is an ordered list of taps and swipes, accumulated fluently and
//! replayed once by the executor. Batches also have a plain-text script
//! form, one gesture per line:
//!
//! ```text
//! tap 1765 750
//! swipe 1210 970 1210 285
//! ```

use crate::error::NavError;
use resonance_device::Point;
use std::fmt;
use std::str::FromStr;

/// Primitive gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap(Point),
    Swipe(Point, Point),
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap(p) => write!(f, "tap {} {}", p.x, p.y),
            Self::Swipe(a, b) => write!(f, "swipe {} {} {} {}", a.x, a.y, b.x, b.y),
        }
    }
}

impl FromStr for Gesture {
    type Err = NavError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let coords = parts
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| NavError::InvalidGestureKind(line.to_string()))?;

        match (verb, coords.as_slice()) {
            ("tap", &[x, y]) => Ok(Self::Tap(Point::new(x, y))),
            ("swipe", &[x1, y1, x2, y2]) => {
                Ok(Self::Swipe(Point::new(x1, y1), Point::new(x2, y2)))
            }
            _ => Err(NavError::InvalidGestureKind(line.to_string())),
        }
    }
}

/// Ordered list of gestures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureBatch {
    gestures: Vec<Gesture>,
}

impl GestureBatch {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tap
    #[inline]
    #[must_use]
    pub fn tap(mut self, point: Point) -> Self {
        self.gestures.push(Gesture::Tap(point));
        self
    }

    /// Append a swipe
    #[inline]
    #[must_use]
    pub fn swipe(mut self, from: Point, to: Point) -> Self {
        self.gestures.push(Gesture::Swipe(from, to));
        self
    }

    /// Append every gesture of another batch
    #[must_use]
    pub fn then(mut self, other: GestureBatch) -> Self {
        self.gestures.extend(other.gestures);
        self
    }

    /// Append the same tap `times` times
    #[must_use]
    pub fn tap_repeated(mut self, point: Point, times: usize) -> Self {
        self.gestures
            .extend(std::iter::repeat(Gesture::Tap(point)).take(times));
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gesture> {
        self.gestures.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Gesture] {
        &self.gestures
    }

    /// Parse a script; blank lines and `#` comments are ignored
    ///
    /// # Errors
    /// - `NavError::InvalidGestureKind` naming the first bad line
    pub fn parse_script(script: &str) -> Result<Self, NavError> {
        let gestures = script
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { gestures })
    }
}

impl FromIterator<Gesture> for GestureBatch {
    fn from_iter<I: IntoIterator<Item = Gesture>>(iter: I) -> Self {
        Self {
            gestures: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GestureBatch {
    type Item = &'a Gesture;
    type IntoIter = std::slice::Iter<'a, Gesture>;

    fn into_iter(self) -> Self::IntoIter {
        self.gestures.iter()
    }
}

impl fmt::Display for GestureBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gesture in &self.gestures {
            writeln!(f, "{gesture}")?;
        }
        Ok(())
    }
}

impl FromStr for GestureBatch {
    type Err = NavError;

    fn from_str(script: &str) -> Result<Self, Self::Err> {
        Self::parse_script(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_accumulation_keeps_order() {
        let batch = GestureBatch::new()
            .tap(Point::new(1, 2))
            .swipe(Point::new(3, 4), Point::new(5, 6))
            .tap(Point::new(7, 8));

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.as_slice()[0], Gesture::Tap(Point::new(1, 2)));
        assert_eq!(
            batch.as_slice()[1],
            Gesture::Swipe(Point::new(3, 4), Point::new(5, 6))
        );
    }

    #[test]
    fn test_then_concatenates() {
        let a = GestureBatch::new().tap(Point::new(1, 1));
        let b = GestureBatch::new().tap(Point::new(2, 2));
        let joined = a.then(b);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.as_slice()[1], Gesture::Tap(Point::new(2, 2)));
    }

    #[test]
    fn test_script_renders_and_parses() {
        let batch = GestureBatch::new()
            .tap(Point::new(1765, 750))
            .swipe(Point::new(1210, 970), Point::new(1210, 285));
        let script = batch.to_string();
        assert_eq!(script, "tap 1765 750\nswipe 1210 970 1210 285\n");
        assert_eq!(script.parse::<GestureBatch>().unwrap(), batch);
    }

    #[test]
    fn test_script_skips_comments_and_blanks() {
        let batch = GestureBatch::parse_script("# enter urban\n\ntap 1765 750\n").unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_unknown_verb_is_invalid_gesture_kind() {
        let err = GestureBatch::parse_script("tap 1 2\npinch 3 4").unwrap_err();
        assert!(matches!(err, NavError::InvalidGestureKind(line) if line == "pinch 3 4"));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!("tap 1".parse::<Gesture>().is_err());
        assert!("swipe 1 2 3".parse::<Gesture>().is_err());
        assert!("tap x y".parse::<Gesture>().is_err());
    }
}
