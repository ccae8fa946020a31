//! Path history from the origin to the agent's current tile.

use tile_crawl_core::Coordinate;

/// Ordered path from the origin to the agent's current coordinate.
///
/// The top is stored apart from the tiles beneath it, so the stack can never
/// be emptied: popping stops once only the origin remains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationStack {
    below: Vec<Coordinate>,
    top: Coordinate,
}

impl NavigationStack {
    /// Creates a stack holding only `origin`.
    #[must_use]
    pub fn new(origin: Coordinate) -> Self {
        Self {
            below: Vec::new(),
            top: origin,
        }
    }

    /// Coordinate the agent currently occupies.
    #[must_use]
    pub const fn top(&self) -> Coordinate {
        self.top
    }

    /// Coordinate the agent occupied immediately before the top, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Coordinate> {
        self.below.last().copied()
    }

    /// Number of coordinates on the stack; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.below.len() + 1
    }

    /// Always `false`: the origin can never be popped.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Pushes `coordinate` as the new top.
    pub(crate) fn push(&mut self, coordinate: Coordinate) {
        debug_assert_ne!(coordinate, self.top, "consecutive duplicate on path");
        let previous = std::mem::replace(&mut self.top, coordinate);
        self.below.push(previous);
    }

    /// Removes the top and returns it, unless it is the only entry.
    pub(crate) fn pop(&mut self) -> Option<Coordinate> {
        let previous = self.below.pop()?;
        Some(std::mem::replace(&mut self.top, previous))
    }

    /// Iterator from the origin to the top.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.below
            .iter()
            .copied()
            .chain(std::iter::once(self.top))
    }

    /// Copies the path into a vector ordered from the origin to the top.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Coordinate> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_origin_only() {
        let stack = NavigationStack::new(Coordinate::ZERO);
        assert_eq!(stack.top(), Coordinate::ZERO);
        assert_eq!(stack.previous(), None);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.to_vec(), vec![Coordinate::ZERO]);
    }

    #[test]
    fn push_moves_top_below() {
        let mut stack = NavigationStack::new(Coordinate::ZERO);
        stack.push(Coordinate::new(0, 10));
        stack.push(Coordinate::new(10, 10));

        assert_eq!(stack.top(), Coordinate::new(10, 10));
        assert_eq!(stack.previous(), Some(Coordinate::new(0, 10)));
        assert_eq!(
            stack.to_vec(),
            vec![
                Coordinate::ZERO,
                Coordinate::new(0, 10),
                Coordinate::new(10, 10)
            ]
        );
    }

    #[test]
    fn pop_refuses_to_remove_origin() {
        let mut stack = NavigationStack::new(Coordinate::ZERO);
        stack.push(Coordinate::new(0, 10));

        assert_eq!(stack.pop(), Some(Coordinate::new(0, 10)));
        assert_eq!(stack.top(), Coordinate::ZERO);
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.top(), Coordinate::ZERO);
        assert_eq!(stack.len(), 1);
        assert!(!stack.is_empty());
    }
}
