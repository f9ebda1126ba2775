use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Three-way ordering function shared by the ordered containers
///
/// All the relational helpers are derived from the single `compare`
/// function, so a custom ordering only needs to provide that one.
pub struct Comparator<T> {
    compare: Rc<dyn Fn(&T, &T) -> Ordering>,
}

impl<T> Comparator<T> {
    /// Create a comparator from a custom ordering function
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            compare: Rc::new(compare),
        }
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    pub fn equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    pub fn less_than(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    pub fn greater_than(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    pub fn less_or_equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    pub fn greater_or_equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) != Ordering::Less
    }
}

impl<T: 'static> Comparator<T> {
    /// Comparator with the inverted ordering
    pub fn reverse(&self) -> Self {
        let compare = Rc::clone(&self.compare);
        Self::new(move |a, b| compare(b, a))
    }
}

impl<T: PartialOrd> Comparator<T> {
    /// Comparator using the natural ordering of `T`
    ///
    /// Incomparable values (e.g. NaN) are treated as equal.
    pub fn natural() -> Self {
        Self::new(|a: &T, b: &T| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }
}

impl<T: PartialOrd> Default for Comparator<T> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator").finish_non_exhaustive()
    }
}
