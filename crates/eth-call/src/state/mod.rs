//! Versioned world state.
//!
//! The [`ChainStore`] keeps one immutable [`BlockState`] per finalized block. A [`StateView`] is a
//! cheap handle on one of them, and a [`StateOverlay`] is the copy-on-write layer a single
//! execution writes into.

mod account;
pub use account::*;

mod block;
pub use block::*;

mod overlay;
pub use overlay::*;

mod store;
pub use store::*;

mod view;
pub use view::*;
