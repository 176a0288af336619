use std::fmt::Debug;
use std::hash::Hash;

/// Anything that can be laid out on the board.
///
/// Two items with equal categories may not sit on adjacent squares. Copies of one item share its category.
pub trait Categorized {
    /// The identity compared between neighbours.
    type Category: Eq + Hash + Clone + Debug;

    /// This item's category.
    fn category(&self) -> &Self::Category;

    /// Whether the item has no usable category, such as a word with no spelling.
    ///
    /// A pool made only of blank items counts as empty.
    fn is_blank(&self) -> bool {
        false
    }
}

impl Categorized for String {
    type Category = String;

    fn category(&self) -> &Self::Category {
        self
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Categorized for &'static str {
    type Category = &'static str;

    fn category(&self) -> &Self::Category {
        self
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<C, V> Categorized for (C, V)
where
    C: Eq + Hash + Clone + Debug,
{
    type Category = C;

    fn category(&self) -> &Self::Category {
        &self.0
    }
}
