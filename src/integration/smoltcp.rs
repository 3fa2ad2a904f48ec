//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Implements `smoltcp::phy::Device` for [`RmiiEthernet`], so the driver can
//! sit under a smoltcp `Interface` instead of a [`NetStack`] host.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface, SocketSet};
//! use ph_rmii_pio::integration::smoltcp::ethernet_address;
//!
//! let config = Config::new(ethernet_address(&eth).into());
//! let mut iface = Interface::new(config, &mut eth, now());
//!
//! loop {
//!     eth.poll_link();
//!     iface.poll(now(), &mut eth, &mut sockets);
//! }
//! ```
//!
//! # Tokens
//!
//! The receive token owns a copy of the frame: the slot is verified, copied
//! out and released to the capture side before smoltcp sees the token. The
//! transmit token borrows the transmitter and lets smoltcp build the frame
//! directly in the DMA scratch buffer.
//!
//! [`NetStack`]: crate::driver::netif::NetStack

use crate::driver::ethernet::RmiiEthernet;
use crate::driver::stats::Instrumentation;
use crate::frame::rx::RxOutcome;
use crate::frame::tx::Transmitter;
use crate::hal::clock::Clock;
use crate::hal::mdio::MdioBus;
use crate::hal::sequencer::TransmitChannel;
use crate::internal::constants::MAX_PAYLOAD_SIZE;

use smoltcp::phy::{Checksum, ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

// =============================================================================
// RX Token
// =============================================================================

/// Receive token holding one verified frame (FCS excluded)
pub struct RmiiRxToken {
    buf: [u8; MAX_PAYLOAD_SIZE],
    len: usize,
}

impl smoltcp::phy::RxToken for RmiiRxToken {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        f(&self.buf[..self.len])
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token borrowing the transmitter
pub struct RmiiTxToken<'t, 'a, T: TransmitChannel, S: Instrumentation> {
    tx: &'t mut Transmitter<'a, T, S>,
}

impl<T: TransmitChannel, S: Instrumentation> smoltcp::phy::TxToken for RmiiTxToken<'_, '_, T, S> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let (_, result) = self.tx.transmit_with(len, f);
        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<'a, M, T, K, S, const N: usize> Device for RmiiEthernet<'a, M, T, K, S, N>
where
    M: MdioBus,
    T: TransmitChannel,
    K: Clock,
    S: Instrumentation,
{
    type RxToken<'t>
        = RmiiRxToken
    where
        Self: 't;
    type TxToken<'t>
        = RmiiTxToken<'t, 'a, T, S>
    where
        Self: 't;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        let mut token = RmiiRxToken {
            buf: [0; MAX_PAYLOAD_SIZE],
            len: 0,
        };
        let (rx, tx) = self.split_data_path();

        // Dropped frames are counted by the consumer; keep going until a
        // good one turns up or the ring is empty.
        loop {
            match rx.try_receive_into(&mut token.buf) {
                RxOutcome::Delivered(len) => {
                    token.len = len;
                    break;
                }
                RxOutcome::Idle => return None,
                RxOutcome::BadCrc | RxOutcome::NoBuffer | RxOutcome::DeliveryFailed => {}
            }
        }

        Some((token, RmiiTxToken { tx }))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        let tx = self.transmitter_mut();
        if !tx.is_ready() {
            return None;
        }
        Some(RmiiTxToken { tx })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        // Ethernet header included, FCS excluded
        caps.max_transmission_unit = MAX_PAYLOAD_SIZE;
        caps.max_burst_size = Some(1);

        // No checksum offload
        caps.checksum = ChecksumCapabilities::default();
        caps.checksum.ipv4 = Checksum::Both;
        caps.checksum.udp = Checksum::Both;
        caps.checksum.tcp = Checksum::Both;
        caps.checksum.icmpv4 = Checksum::Both;

        caps
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// The interface's hardware address as a smoltcp `EthernetAddress`
pub fn ethernet_address<M, T, K, S, const N: usize>(
    eth: &RmiiEthernet<'_, M, T, K, S, N>,
) -> smoltcp::wire::EthernetAddress
where
    M: MdioBus,
    T: TransmitChannel,
    K: Clock,
    S: Instrumentation,
{
    smoltcp::wire::EthernetAddress(eth.hardware_address())
}
