//! Unit state and flag bitsets touched by motion generators

use bitflags::bitflags;

bitflags! {
    /// Transient unit states.
    ///
    /// Each generator owns an "active" bit and a "motion" bit. The motion bit
    /// is set only while a launched path is playing back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UnitState: u32 {
        /// Unit is dead
        const DIED          = 1 << 0;
        /// Unit is stunned
        const STUNNED       = 1 << 1;
        /// Unit is rooted in place
        const ROOT          = 1 << 2;
        /// Unit rides a taxi path
        const TAXI_FLIGHT   = 1 << 3;
        /// Confused generator active
        const CONFUSED      = 1 << 4;
        /// Confused generator playing a path
        const CONFUSED_MOVE = 1 << 5;
        /// Fleeing or panic generator active
        const FLEEING       = 1 << 6;
        /// Fleeing or panic generator playing a path
        const FLEEING_MOVE  = 1 << 7;
        /// Wander generator active
        const ROAMING       = 1 << 8;
        /// Wander generator playing a path
        const ROAMING_MOVE  = 1 << 9;
        /// Panic generator active
        const PANIC         = 1 << 10;
        /// Persistent preference to run rather than walk
        const RUNNING       = 1 << 11;

        /// States that forbid free movement
        const NO_FREE_MOVE = Self::ROOT.bits()
            | Self::STUNNED.bits()
            | Self::DIED.bits()
            | Self::TAXI_FLIGHT.bits()
            | Self::CONFUSED.bits()
            | Self::FLEEING.bits();
    }
}

bitflags! {
    /// Persistent unit flags visible to clients.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UnitFlags: u32 {
        /// Unit is controlled by a player
        const PLAYER_CONTROLLED = 1 << 0;
        /// Unit displays as fleeing
        const FLEEING           = 1 << 1;
    }
}
