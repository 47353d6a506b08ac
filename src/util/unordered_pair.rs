/// WEIRD Project
/// `File` util/unordered_pair.rs
/// `Description` Unordered pair, used as undirected edge key
/// `Author` TioT2
/// `Last changed` 16.10.2026

/// Unordered pair representation structure
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct UnorderedPair<T> {
    first: T,
    second: T,
} // struct UnorderedPair

impl<T: PartialOrd> UnorderedPair<T> {
    /// Pair construction function, elements are stored sorted
    pub fn new(first: T, second: T) -> Self {
        if first < second {
            Self { first, second }
        } else {
            Self { first: second, second: first }
        }
    } // fn new

    /// Element containment checking function
    pub fn contains(&self, value: &T) -> bool {
        self.first == *value || self.second == *value
    } // fn contains
} // impl UnorderedPair

impl<T> UnorderedPair<T> {
    /// Smaller element
    pub fn first(&self) -> &T {
        &self.first
    }

    /// Larger element
    pub fn second(&self) -> &T {
        &self.second
    }
} // impl UnorderedPair

impl<T: PartialOrd> From<(T, T)> for UnorderedPair<T> {
    fn from(value: (T, T)) -> Self {
        Self::new(value.0, value.1)
    }
} // impl From for UnorderedPair

impl<T> From<UnorderedPair<T>> for (T, T) {
    fn from(value: UnorderedPair<T>) -> Self {
        (value.first, value.second)
    }
} // impl From<UnorderedPair> for (T, T)


// file util/unordered_pair.rs
