/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FreezeCause {
    /// Touched or crossed the field boundary.
    Border,
    /// Ran into its own trail.
    SelfTrail,
    /// Ran into `other`'s trail.
    Trail { other: usize },
    /// Met `other` at the same distance; both stop.
    HeadOn { other: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Frozen { id: usize, cause: FreezeCause },
    RoundOver { survivors: Vec<usize> },
}
