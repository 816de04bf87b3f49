//! Visitor pattern for query results.
//!
//! Traversals hand every hit to a visitor instead of building a list, so a
//! caller can stop allocating, count, or filter without touching the
//! traversal itself.

/// Receives query hits during a traversal.
///
/// `T` is `&C` for ray and frustum casts and `(&C, &C)` for self-queries.
pub trait HitVisitor<T> {
    /// Called once per hit.
    fn visit(&mut self, item: T);
}

/// A simple visitor that collects every hit.
#[derive(Debug)]
pub struct CollectingVisitor<T> {
    collected: Vec<T>,
}

impl<T> Default for CollectingVisitor<T> {
    fn default() -> Self {
        Self {
            collected: Vec::new(),
        }
    }
}

impl<T> CollectingVisitor<T> {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected hits.
    pub fn into_hits(self) -> Vec<T> {
        self.collected
    }

    /// Returns a reference to the collected hits.
    pub fn hits(&self) -> &[T] {
        &self.collected
    }
}

impl<T> HitVisitor<T> for CollectingVisitor<T> {
    fn visit(&mut self, item: T) {
        self.collected.push(item);
    }
}

/// A visitor that calls a closure for each hit.
pub struct FnVisitor<F> {
    func: F,
}

impl<F> FnVisitor<F> {
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<T, F> HitVisitor<T> for FnVisitor<F>
where
    F: FnMut(T),
{
    fn visit(&mut self, item: T) {
        (self.func)(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_visitor_empty() {
        let visitor: CollectingVisitor<u32> = CollectingVisitor::new();
        assert!(visitor.hits().is_empty());
    }

    #[test]
    fn collecting_visitor_keeps_order() {
        let mut visitor = CollectingVisitor::new();
        visitor.visit((1, 2));
        visitor.visit((3, 4));
        assert_eq!(visitor.into_hits(), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut count = 0;
        {
            let mut visitor = FnVisitor::new(|id: &u32| count += *id);
            visitor.visit(&2);
            visitor.visit(&5);
        }
        assert_eq!(count, 7);
    }
}
