//! Per-block decision table.
//!
//! The scan visits the image in 2x2 blocks. For the block whose top-left
//! pixel is `(x, y)` it reads ten pixels:
//!
//! ```text
//!          x-1  x   x+1  x+2
//!   y-1     h   i    j    k      bottom row of the blocks above
//!   y       n   o    p           n, r: right column of the left block
//!   y+1     r   s    t           o, p, s, t: the block itself
//! ```
//!
//! Each pixel contributes one bit to a [`Window`]. The bits fully determine
//! which already-labeled neighbor blocks touch the current block under
//! 8-connectivity:
//!
//! - up-left block: `o & h`
//! - up block: `(o | p) & (i | j)`
//! - up-right block: `p & k`
//! - left block: `(o | s) & (n | r)`
//!
//! Neighbors that the window already proves equivalent (for example `h & i`
//! joins the up-left and up blocks) are dropped from the merge set, so the
//! table picks the smallest set of union operations. The result is one of
//! [`BlockAction::NewLabel`], [`BlockAction::Copy`] or [`BlockAction::Merge`]
//! (plus [`BlockAction::Background`] for an empty block).

/// Bit set of window pixels that are foreground.
pub(crate) type Window = u16;

pub(crate) const PX_O: Window = 1 << 0;
pub(crate) const PX_P: Window = 1 << 1;
pub(crate) const PX_S: Window = 1 << 2;
pub(crate) const PX_T: Window = 1 << 3;
pub(crate) const PX_H: Window = 1 << 4;
pub(crate) const PX_I: Window = 1 << 5;
pub(crate) const PX_J: Window = 1 << 6;
pub(crate) const PX_K: Window = 1 << 7;
pub(crate) const PX_N: Window = 1 << 8;
pub(crate) const PX_R: Window = 1 << 9;

pub(crate) const WINDOW_BITS: u32 = 10;
pub(crate) const TABLE_LEN: usize = 1 << WINDOW_BITS;

const BLOCK_PIXELS: Window = PX_O | PX_P | PX_S | PX_T;

/// An already-labeled block adjacent to the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Neighbor {
    UpLeft,
    Up,
    UpRight,
    Left,
}

impl Neighbor {
    pub(crate) const ALL: [Neighbor; 4] = [
        Neighbor::UpLeft,
        Neighbor::Up,
        Neighbor::UpRight,
        Neighbor::Left,
    ];

    const fn bit(self) -> u8 {
        match self {
            Neighbor::UpLeft => 1 << 0,
            Neighbor::Up => 1 << 1,
            Neighbor::UpRight => 1 << 2,
            Neighbor::Left => 1 << 3,
        }
    }

    /// Block-grid offset `(dx, dy)` relative to the current block.
    #[inline]
    pub(crate) const fn offset(self) -> (isize, isize) {
        match self {
            Neighbor::UpLeft => (-1, -1),
            Neighbor::Up => (0, -1),
            Neighbor::UpRight => (1, -1),
            Neighbor::Left => (-1, 0),
        }
    }
}

/// Small set of [`Neighbor`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct NeighborSet(u8);

impl NeighborSet {
    pub(crate) const EMPTY: NeighborSet = NeighborSet(0);

    #[inline]
    pub(crate) const fn contains(self, n: Neighbor) -> bool {
        self.0 & n.bit() != 0
    }

    #[inline]
    const fn with(self, n: Neighbor) -> NeighborSet {
        NeighborSet(self.0 | n.bit())
    }

    #[inline]
    const fn without(self, n: Neighbor) -> NeighborSet {
        NeighborSet(self.0 & !n.bit())
    }

    #[inline]
    pub(crate) const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// The only member of a one-element set.
    const fn single(self) -> Neighbor {
        match self.0 {
            1 => Neighbor::UpLeft,
            2 => Neighbor::Up,
            4 => Neighbor::UpRight,
            _ => Neighbor::Left,
        }
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = Neighbor> {
        Neighbor::ALL.into_iter().filter(move |&n| self.contains(n))
    }
}

/// What the scan does with the current block's anchor label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlockAction {
    /// No foreground pixel in the block.
    Background,
    /// Foreground, but no labeled neighbor touches it.
    NewLabel,
    /// Exactly one neighbor class touches it.
    Copy(Neighbor),
    /// Two or more neighbor classes touch it and must be joined.
    Merge(NeighborSet),
}

#[inline]
const fn has(window: Window, bits: Window) -> bool {
    window & bits != 0
}

#[inline]
const fn all(window: Window, bits: Window) -> bool {
    window & bits == bits
}

/// Neighbors that touch the block, before pruning equivalent ones.
pub(crate) const fn touching_neighbors(w: Window) -> NeighborSet {
    let mut set = NeighborSet::EMPTY;
    if all(w, PX_O | PX_H) {
        set = set.with(Neighbor::UpLeft);
    }
    if has(w, PX_O | PX_P) && has(w, PX_I | PX_J) {
        set = set.with(Neighbor::Up);
    }
    if all(w, PX_P | PX_K) {
        set = set.with(Neighbor::UpRight);
    }
    if has(w, PX_O | PX_S) && has(w, PX_N | PX_R) {
        set = set.with(Neighbor::Left);
    }
    set
}

/// Drop neighbors already known to share a class with another member.
///
/// Each rule needs its partner to still be in the set, so a chain of drops
/// always leaves one representative of every class.
const fn prune_equivalent(w: Window, mut set: NeighborSet) -> NeighborSet {
    // h-i: the up block's left-neighbor test joined it with the up-left block.
    if set.contains(Neighbor::UpLeft) && set.contains(Neighbor::Up) && all(w, PX_H | PX_I) {
        set = set.without(Neighbor::UpLeft);
    }
    // j-k: the up-right block's left-neighbor test joined it with the up block.
    if set.contains(Neighbor::UpRight) && set.contains(Neighbor::Up) && all(w, PX_J | PX_K) {
        set = set.without(Neighbor::UpRight);
    }
    // h-n: the left block's up-neighbor test joined it with the up-left block.
    if set.contains(Neighbor::UpLeft) && set.contains(Neighbor::Left) && all(w, PX_H | PX_N) {
        set = set.without(Neighbor::UpLeft);
    }
    // i-n: the left block's up-right test joined it with the up block.
    if set.contains(Neighbor::Left) && set.contains(Neighbor::Up) && all(w, PX_I | PX_N) {
        set = set.without(Neighbor::Left);
    }
    set
}

pub(crate) const fn classify(w: Window) -> BlockAction {
    if !has(w, BLOCK_PIXELS) {
        return BlockAction::Background;
    }
    let set = prune_equivalent(w, touching_neighbors(w));
    match set.len() {
        0 => BlockAction::NewLabel,
        1 => BlockAction::Copy(set.single()),
        _ => BlockAction::Merge(set),
    }
}

const fn build_table() -> [BlockAction; TABLE_LEN] {
    let mut table = [BlockAction::Background; TABLE_LEN];
    let mut w = 0;
    while w < TABLE_LEN {
        table[w] = classify(w as Window);
        w += 1;
    }
    table
}

/// Window bit pattern -> action, evaluated at compile time.
pub(crate) static ACTIONS: [BlockAction; TABLE_LEN] = build_table();

#[inline]
pub(crate) fn action(w: Window) -> BlockAction {
    ACTIONS[w as usize]
}

/// Which rows of the block window exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RowKind {
    /// `y == 0` with a row below: nothing above.
    First,
    /// Full window.
    Interior,
    /// Trailing row of an odd-height image: nothing below.
    Last,
    /// Single-row image: neither above nor below.
    Only,
}

impl RowKind {
    #[inline]
    pub(crate) fn for_row(y: usize, height: usize) -> RowKind {
        let has_below = y + 1 < height;
        match (y == 0, has_below) {
            (true, true) => RowKind::First,
            (false, true) => RowKind::Interior,
            (false, false) => RowKind::Last,
            (true, false) => RowKind::Only,
        }
    }

    #[inline]
    pub(crate) fn has_above(self) -> bool {
        matches!(self, RowKind::Interior | RowKind::Last)
    }

    #[inline]
    pub(crate) fn has_below(self) -> bool {
        matches!(self, RowKind::First | RowKind::Interior)
    }
}

/// Whether the block has its right column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Full,
    /// Last block of an odd-width row: one column wide.
    Trailing,
}

impl ColumnKind {
    #[inline]
    pub(crate) fn for_column(x: usize, width: usize) -> ColumnKind {
        if x + 1 < width {
            ColumnKind::Full
        } else {
            ColumnKind::Trailing
        }
    }
}
