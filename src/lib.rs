//! Ordered symbol table on a [left-leaning-red-black][llrb] tree.
//!
//! Entries are kept in key order, and every node counts the entries in
//! its sub-tree, so besides get/set/delete the table answers min, max,
//! floor, ceiling, rank and select in logarithmic time.
//!
//! ```
//! use llrb_symtab::Llrb;
//!
//! let mut st: Llrb<&str, usize> = Llrb::new("letters");
//! for (i, key) in ["S", "E", "A", "R", "C", "H", "X", "M"].iter().enumerate() {
//!     st.set(*key, i);
//! }
//! assert_eq!(st.keys().collect::<Vec<&str>>(), ["A", "C", "E", "H", "M", "R", "S", "X"]);
//! assert_eq!(st.select(3), Ok("H"));
//! assert_eq!(st.rank("M"), 4);
//! ```
//!
//! [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

mod depth;
mod error;
mod iter;
mod llrb;
mod node;

pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::iter::{Keys, Range};
pub use crate::llrb::{Llrb, Stats};
pub use crate::node::Node;
