//! Place slot arena
//!
//! Slot `place - 1` holds the bib currently at `place`. Moves keep the
//! occupied slots free of duplicates and report each bib whose place
//! changed. Places stay dense (`1..=K`) as long as first placements do
//! not skip past the end.

use race_types::Bib;

/// A bib and the place it now holds
pub type Assignment = (u32, Bib);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceIndex {
    slots: Vec<Option<Bib>>,
}

impl PlaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bib at `place`, if any
    pub fn get(&self, place: u32) -> Option<Bib> {
        let index = (place as usize).checked_sub(1)?;
        self.slots.get(index).copied().flatten()
    }

    /// Highest occupied place, 0 when empty. Trailing free slots are trimmed.
    pub fn highest(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Occupied places in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|bib| (i as u32 + 1, bib)))
    }

    /// Occupied places within `[from, to]`, ascending
    pub fn range(&self, from: u32, to: u32) -> Vec<Assignment> {
        (from..=to).filter_map(|p| self.get(p).map(|bib| (p, bib))).collect()
    }

    fn set(&mut self, place: u32, bib: Bib) {
        let index = place as usize - 1;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(bib);
    }

    fn take(&mut self, place: u32) -> Option<Bib> {
        let bib = self.slots.get_mut(place as usize - 1)?.take();
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        bib
    }

    fn shift(&mut self, from: u32, to: u32, moved: &mut Vec<Assignment>) {
        if let Some(bib) = self.take(from) {
            self.set(to, bib);
            moved.push((to, bib));
        }
    }

    /// Place a bib that holds no place yet, exactly at `target` (1-based).
    ///
    /// An occupied target pushes it and the run of occupied places above it
    /// up by one. Returns every reassigned bib, the inserted one last.
    pub fn insert(&mut self, bib: Bib, target: u32) -> Vec<Assignment> {
        let target = target.max(1);
        let mut free = target;
        while self.get(free).is_some() {
            free += 1;
        }

        let mut moved = Vec::new();
        for place in (target..free).rev() {
            self.shift(place, place + 1, &mut moved);
        }
        self.set(target, bib);
        moved.push((target, bib));
        moved
    }

    /// Move the bib at `previous` to `target`.
    ///
    /// Moving down (`previous < target`) pulls every place in
    /// `(previous, target]` up by one; the target is clamped to the highest
    /// occupied place. Moving up pushes every place in `[target, previous)`
    /// down by one. Returns the inclusive span of touched places and every
    /// reassigned bib.
    pub fn relocate(&mut self, previous: u32, target: u32) -> ((u32, u32), Vec<Assignment>) {
        let mut moved = Vec::new();
        let Some(bib) = self.get(previous) else {
            return ((previous, previous), moved);
        };
        let target = target.clamp(1, self.highest());

        if previous < target {
            self.slots[previous as usize - 1] = None;
            for place in previous + 1..=target {
                self.shift(place, place - 1, &mut moved);
            }
            self.set(target, bib);
            moved.push((target, bib));
            ((previous, target), moved)
        } else {
            self.slots[previous as usize - 1] = None;
            for place in (target..previous).rev() {
                self.shift(place, place + 1, &mut moved);
            }
            self.set(target, bib);
            moved.push((target, bib));
            ((target, previous), moved)
        }
    }
}
