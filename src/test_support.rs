use std::sync::Once;

use simplelog::{Config, LevelFilter, TestLogger};

use crate::node::Handle;
use crate::{First, Identity, RbTree};

pub(crate) type Set = RbTree<i32, Identity>;
pub(crate) type Multi = RbTree<(i32, usize), First>;

pub(crate) fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    });
}

/// Handles of all nodes, in order.
pub(crate) fn handles<T, P>(tree: &RbTree<T, P>) -> Vec<Handle> {
    let mut out = Vec::with_capacity(tree.len());
    let mut pos = tree.begin();
    while let Some(handle) = pos.handle() {
        out.push(handle);
        pos = tree.next_pos(pos);
    }
    out
}
