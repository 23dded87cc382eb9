use bitflags::bitflags;

bitflags! {
    /// Snapshot of the routing and connection attributes observed for a
    /// target at query time.
    ///
    /// A snapshot is read fresh for every query and never persisted;
    /// status is always recomputed from the latest value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReachabilityFlags: u32 {
        /// Traffic to the target can be routed with the current
        /// network configuration
        const REACHABLE             = 1 << 0;
        /// The route uses a transient link (e.g. point-to-point)
        const TRANSIENT_CONNECTION  = 1 << 1;
        /// A connection must be established before traffic can flow
        const CONNECTION_REQUIRED   = 1 << 2;
        /// The connection is established when traffic is first sent
        const CONNECTION_ON_TRAFFIC = 1 << 3;
        /// Establishing the connection needs user intervention
        const INTERVENTION_REQUIRED = 1 << 4;
        /// The connection is established on demand
        const CONNECTION_ON_DEMAND  = 1 << 5;
        /// The target address is assigned to a local interface
        const IS_LOCAL_ADDRESS      = 1 << 6;
        /// The target is on a directly attached link, no gateway hop
        const IS_DIRECT             = 1 << 7;
        /// The route crosses a cellular (WWAN) interface
        const IS_CELLULAR           = 1 << 8;
    }
}

/// Compact single-line rendering used in diagnostic logging, one
/// position per flag: `WR tcCiDld`, absent bits shown as `-`.
impl std::fmt::Display for ReachabilityFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bit = |flag: Self, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{} {}{}{}{}{}{}{}",
            bit(Self::IS_CELLULAR, 'W'),
            bit(Self::REACHABLE, 'R'),
            bit(Self::TRANSIENT_CONNECTION, 't'),
            bit(Self::CONNECTION_REQUIRED, 'c'),
            bit(Self::CONNECTION_ON_TRAFFIC, 'C'),
            bit(Self::INTERVENTION_REQUIRED, 'i'),
            bit(Self::CONNECTION_ON_DEMAND, 'D'),
            bit(Self::IS_LOCAL_ADDRESS, 'l'),
            bit(Self::IS_DIRECT, 'd'),
        )
    }
}
