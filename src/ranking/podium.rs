/// The three best entries of a ranking.
///
/// Displayed left-to-right as second, first, third with the winner raised in
/// the center; [`Podium::layout`] yields that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Podium<T> {
    /// Winner, shown in the center.
    pub first: Option<T>,
    /// Runner-up, shown on the left.
    pub second: Option<T>,
    /// Third place, shown on the right.
    pub third: Option<T>,
}

impl<T> Default for Podium<T> {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
            third: None,
        }
    }
}

impl<T> Podium<T> {
    /// Slots in display order: `[left, center, right]` = `[2nd, 1st, 3rd]`.
    pub fn layout(&self) -> [Option<&T>; 3] {
        [self.second.as_ref(), self.first.as_ref(), self.third.as_ref()]
    }

    /// Convert every occupied place, keeping empty places empty.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Podium<U> {
        Podium {
            first: self.first.map(&mut f),
            second: self.second.map(&mut f),
            third: self.third.map(&mut f),
        }
    }

    /// True when the ranking had no entries at all.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

/// Take the podium from an already ranked slice. Missing places stay empty.
pub fn podium<T: Clone>(ranked: &[T]) -> Podium<T> {
    let mut places = ranked.iter().cloned();
    Podium {
        first: places.next(),
        second: places.next(),
        third: places.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{rank, test_support::attempt};

    #[test]
    fn winner_is_in_the_center() {
        let ranked = rank(vec![attempt("A", 4.0, 0), attempt("B", 2.0, 1), attempt("C", 3.0, 2)]);
        let podium = podium(&ranked).map(|a| a.time);

        assert_eq!(podium.layout(), [Some(&3.0), Some(&2.0), Some(&4.0)]);
    }

    #[test]
    fn short_rankings_leave_slots_empty() {
        let ranked = rank(vec![attempt("A", 2.2, 0)]);
        let podium = podium(&ranked).map(|a| a.name);

        assert_eq!(podium.first.as_deref(), Some("A"));
        assert!(podium.second.is_none());
        assert!(podium.third.is_none());
        assert_eq!(podium.layout(), [None, Some(&"A".to_string()), None]);
    }

    #[test]
    fn empty_ranking_has_empty_podium() {
        let podium = podium::<u32>(&[]);
        assert!(podium.is_empty());
        assert_eq!(podium, Podium::default());
    }
}
