//! Host network stack contract
//!
//! The driver sits below a TCP/IP stack that owns addressing, ARP, DHCP and
//! sockets. [`NetStack`] is what the poll loop calls into; [`Netif`]
//! describes the interface the stack should register.

use crate::driver::error::IoResult;
use crate::internal::constants::{MAC_ADDR_LEN, MTU};

/// Calls from the driver into the host stack
///
/// All methods run in poll context.
pub trait NetStack {
    /// Receive buffer handed to [`input`](NetStack::input)
    type Buffer: AsMut<[u8]>;

    /// Allocate a buffer of at least `len` bytes for a received frame
    ///
    /// Return [`IoError::NoBuffer`](crate::driver::error::IoError::NoBuffer)
    /// when none is available; the frame is then dropped and counted.
    fn alloc_rx(&mut self, len: usize) -> IoResult<Self::Buffer>;

    /// Deliver a frame (without FCS). On error the buffer is dropped.
    fn input(&mut self, frame: Self::Buffer, len: usize) -> IoResult<()>;

    /// The PHY reported link up
    fn link_up(&mut self) {}

    /// The PHY reported link down
    fn link_down(&mut self) {}

    /// Run the stack's timers; called once per poll round
    fn service_timers(&mut self) {}
}

/// Interface capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetifFlags(u8);

impl NetifFlags {
    /// Broadcast capable
    pub const BROADCAST: Self = Self(1 << 0);
    /// Uses ARP
    pub const ETHARP: Self = Self(1 << 1);
    /// Ethernet framing
    pub const ETHERNET: Self = Self(1 << 2);
    /// IPv4 multicast (IGMP)
    pub const IGMP: Self = Self(1 << 3);
    /// IPv6 multicast listener discovery
    pub const MLD6: Self = Self(1 << 4);

    /// No flags
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Union of two flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether all of `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for NetifFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Interface description for the host stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Netif {
    /// Two-character interface name
    pub name: [u8; 2],
    /// IP MTU
    pub mtu: u16,
    /// Hardware address
    pub hwaddr: [u8; MAC_ADDR_LEN],
    /// Capability flags
    pub flags: NetifFlags,
}

impl Netif {
    /// Describe the RMII interface with hardware address `hwaddr`
    #[must_use]
    pub const fn new(hwaddr: [u8; MAC_ADDR_LEN]) -> Self {
        Self {
            name: *b"e0",
            mtu: MTU as u16,
            hwaddr,
            flags: NetifFlags::BROADCAST
                .union(NetifFlags::ETHARP)
                .union(NetifFlags::ETHERNET)
                .union(NetifFlags::IGMP)
                .union(NetifFlags::MLD6),
        }
    }

    /// Hardware address length
    #[must_use]
    pub const fn hwaddr_len(&self) -> usize {
        MAC_ADDR_LEN
    }
}
