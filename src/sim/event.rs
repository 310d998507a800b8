/// Events emitted during a simulation tick.
/// The presentation layer consumes these for sound effects; the simulation
/// itself never depends on them.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    KeyCollected { col: usize, row: usize },
    DoorUnlockStarted { col: usize, row: usize },
    DoorOpened { col: usize, row: usize },
    LevelCompleted,
    GameWon,
}
