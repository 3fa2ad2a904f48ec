//! RMII Ethernet interface
//!
//! Ties the poll-side pieces together: the MDIO bus and PHY, the link
//! monitor, the receive consumer and the transmitter. The interrupt-side
//! [`RxProducer`](crate::frame::rx::RxProducer) lives elsewhere (usually an
//! [`IsrCell`](crate::sync::IsrCell)) and never touches this struct.
//!
//! # Poll loop
//!
//! Each [`poll`](RmiiEthernet::poll) round does, in order:
//!
//! 1. link service, when the poll interval has elapsed (plus the
//!    statistics report)
//! 2. one bounded wait for a received frame, delivered to the host stack
//! 3. host stack timer service
//!
//! # Example
//!
//! ```ignore
//! static mut RING: RxRing<NoStats, 4> = RxRing::new(NoStats);
//! static mut TX_BUF: TxBuffer = TxBuffer::new();
//!
//! let ring = unsafe { &mut *core::ptr::addr_of_mut!(RING) };
//! let (mut producer, consumer) = ring.split(Capture::Single(capture));
//! producer.start();
//! PRODUCER.install(producer);
//!
//! let stats = consumer.stats();
//! let tx = Transmitter::new(tx_channel, unsafe { &mut *core::ptr::addr_of_mut!(TX_BUF) }, stats);
//! let mut eth = RmiiEthernet::new(RmiiConfig::new(), &unique_id, mdio, consumer, tx, timer)?;
//! eth.init()?;
//! eth.run(&mut stack);
//! ```

use crate::driver::config::RmiiConfig;
use crate::driver::error::{ConfigError, ConfigResult, Result};
use crate::driver::link::{LinkEvent, LinkMonitor};
use crate::driver::netif::{NetStack, Netif};
use crate::driver::stats::{Instrumentation, Section};
use crate::frame::rx::{RxConsumer, RxOutcome};
use crate::frame::tx::Transmitter;
use crate::hal::clock::Clock;
use crate::hal::mdio::MdioBus;
use crate::hal::sequencer::TransmitChannel;
use crate::internal::constants::MAC_ADDR_LEN;
use crate::phy::generic::{self, DEFAULT_PHY_ADDR};
use crate::phy::lan8720a::Lan8720a;

/// Poll-side RMII Ethernet driver
pub struct RmiiEthernet<'a, M, T, K, S, const N: usize>
where
    M: MdioBus,
    T: TransmitChannel,
    K: Clock,
    S: Instrumentation,
{
    config: RmiiConfig,
    netif: Netif,
    mdio: M,
    phy: Lan8720a,
    link: LinkMonitor,
    rx: RxConsumer<'a, S, N>,
    tx: Transmitter<'a, T, S>,
    clock: K,
}

impl<'a, M, T, K, S, const N: usize> RmiiEthernet<'a, M, T, K, S, N>
where
    M: MdioBus,
    T: TransmitChannel,
    K: Clock,
    S: Instrumentation,
{
    /// Validate `config` and assemble the driver
    ///
    /// `unique_id` is the board's 8-byte unique identifier, used for the
    /// hardware address when the configuration does not override it. `rx`
    /// must come from a ring split with as many capture channels as the
    /// configured [`CaptureMode`](crate::driver::config::CaptureMode).
    pub fn new(
        config: RmiiConfig,
        unique_id: &[u8; 8],
        mdio: M,
        rx: RxConsumer<'a, S, N>,
        tx: Transmitter<'a, T, S>,
        clock: K,
    ) -> ConfigResult<Self> {
        config.validate()?;
        if rx.capture_mode() != config.capture_mode {
            return Err(ConfigError::CaptureModeMismatch);
        }
        let netif = Netif::new(config.hardware_address(unique_id));
        Ok(Self {
            link: LinkMonitor::new(config.link_poll_interval_us),
            config,
            netif,
            mdio,
            phy: Lan8720a::new(DEFAULT_PHY_ADDR),
            rx,
            tx,
            clock,
        })
    }

    /// Discover the PHY and start auto-negotiation
    ///
    /// A bus with no responding PHY is not an error: the default address is
    /// kept and bring-up proceeds against it.
    pub fn init(&mut self) -> Result<()> {
        let addr = match generic::discover_address(&mut self.mdio) {
            Some(addr) => {
                info!("PHY found at address {}", addr);
                addr
            }
            None => {
                warn!("no PHY responded, using address {}", DEFAULT_PHY_ADDR);
                DEFAULT_PHY_ADDR
            }
        };
        self.phy = Lan8720a::new(addr);
        self.phy.init(&mut self.mdio, self.config.advertise_10mbps)
    }

    /// One round of link service, receive and timer service
    pub fn poll<H: NetStack>(&mut self, host: &mut H) -> RxOutcome {
        match self.poll_link() {
            Some(LinkEvent::Up) => host.link_up(),
            Some(LinkEvent::Down) => host.link_down(),
            None => {}
        }

        let outcome = self.rx.receive(host, &self.clock, self.config.rx_wait_timeout_us);
        host.service_timers();
        outcome
    }

    /// Poll forever
    pub fn run<H: NetStack>(&mut self, host: &mut H) -> ! {
        loop {
            self.poll(host);
        }
    }

    /// Service the link monitor if its interval has elapsed
    ///
    /// Also emits the periodic statistics report. [`poll`](Self::poll)
    /// calls this; call it directly when driving the interface another way.
    pub fn poll_link(&mut self) -> Option<LinkEvent> {
        let now = self.clock.now_us();
        if !self.link.due(now) {
            return None;
        }

        let event = match self.link.poll(&mut self.mdio, self.phy.address(), now) {
            Ok(event) => event,
            Err(e) => {
                debug!("link poll failed: {}", e.as_str());
                None
            }
        };
        match event {
            Some(LinkEvent::Up) => info!("link up"),
            Some(LinkEvent::Down) => info!("link down"),
            None => {}
        }

        self.report_stats();
        event
    }

    fn report_stats(&self) {
        if !S::ENABLED {
            return;
        }
        let stats = self.rx.stats();

        let report = stats.take_report();
        if !report.is_empty() {
            info!(
                "rx_ok {} tx_ok {} rx_full {} bad_crc {} alloc_fail {} deliver_fail {} deadlock_clear {}",
                report.rx_ok,
                report.tx_ok,
                report.rx_full,
                report.bad_crc,
                report.alloc_fail,
                report.deliver_fail,
                report.deadlock_clear
            );
        }

        for section in Section::ALL {
            if let Some(window) = stats.take_window(section) {
                info!(
                    "{}: min {} us max {} us avg {} us ({} samples)",
                    section.as_str(),
                    window.min_us,
                    window.max_us,
                    window.total_us / window.count.max(1),
                    window.count
                );
            }
        }
    }

    /// Transmit a contiguous frame (FCS appended here)
    pub fn transmit(&mut self, frame: &[u8]) -> usize {
        self.tx.transmit(frame)
    }

    /// Transmit a frame gathered from `fragments`
    pub fn transmit_chain<'f, I>(&mut self, total_len: usize, fragments: I) -> usize
    where
        I: IntoIterator<Item = &'f [u8]>,
    {
        self.tx.transmit_chain(total_len, fragments)
    }

    /// Interface description for the host stack
    pub fn netif(&self) -> &Netif {
        &self.netif
    }

    /// Hardware address in use
    pub fn hardware_address(&self) -> [u8; MAC_ADDR_LEN] {
        self.netif.hwaddr
    }

    /// MDIO address of the PHY
    pub fn phy_address(&self) -> u8 {
        self.phy.address()
    }

    /// Cached link state
    pub fn is_link_up(&self) -> bool {
        self.link.is_up()
    }

    /// Active configuration
    pub fn config(&self) -> &RmiiConfig {
        &self.config
    }

    /// Instrumentation shared with the interrupt handler
    pub fn stats(&self) -> &'a S {
        self.rx.stats()
    }

    /// Read a PHY register at the discovered address
    pub fn read_phy_reg(&mut self, reg: u8) -> Result<u16> {
        self.mdio.read(self.phy.address(), reg)
    }

    /// Write a PHY register at the discovered address
    pub fn write_phy_reg(&mut self, reg: u8, value: u16) -> Result<()> {
        self.mdio.write(self.phy.address(), reg, value)
    }

    /// The MDIO bus
    pub fn mdio_mut(&mut self) -> &mut M {
        &mut self.mdio
    }

    /// The receive consumer
    pub fn receiver_mut(&mut self) -> &mut RxConsumer<'a, S, N> {
        &mut self.rx
    }

    /// The transmitter
    pub fn transmitter_mut(&mut self) -> &mut Transmitter<'a, T, S> {
        &mut self.tx
    }

    /// Borrow the receiver and transmitter at once
    pub fn split_data_path(&mut self) -> (&mut RxConsumer<'a, S, N>, &mut Transmitter<'a, T, S>) {
        (&mut self.rx, &mut self.tx)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::*;
    use crate::driver::config::CaptureMode;
    use crate::driver::stats::{Counter, Counters, NoStats};
    use crate::frame::rx::{Capture, RxRing};
    use crate::frame::tx::TxBuffer;
    use crate::hal::mdio::{bmcr, bmsr, phy_reg};
    use crate::testing::{MockCapture, MockClock, MockMdioBus, MockStack, MockTransmit, numbered_frame};

    const UID: [u8; 8] = [0xE6, 0x61, 0x41, 0x04, 0x03, 0x2A, 0x55, 0x2F];

    #[test]
    fn rejects_invalid_config() {
        let mut ring = RxRing::<NoStats, 4>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();

        let config = RmiiConfig::new().with_retclk_pin(22);
        let result = RmiiEthernet::new(config, &UID, MockMdioBus::new(), consumer, tx, &clock);
        assert!(matches!(result, Err(ConfigError::InvalidClockPin)));
    }

    #[test]
    fn hardware_address_from_unique_id() {
        let mut ring = RxRing::<NoStats, 4>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();

        let eth = RmiiEthernet::new(RmiiConfig::new(), &UID, MockMdioBus::new(), consumer, tx, &clock).unwrap();
        assert_eq!(eth.hardware_address(), [0xB8, 0x27, 0xEB, 0x2A, 0x55, 0x2F]);
        assert_eq!(&eth.netif().name, b"e0");
    }

    #[test]
    fn init_discovers_phy_and_starts_autoneg() {
        let mut ring = RxRing::<NoStats, 4>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();
        let mdio = MockMdioBus::new();
        mdio.setup_phy(1);

        let mut eth = RmiiEthernet::new(RmiiConfig::new(), &UID, mdio, consumer, tx, &clock).unwrap();
        eth.init().unwrap();

        assert_eq!(eth.phy_address(), 1);
        assert_eq!(
            eth.mdio_mut().get_writes(),
            vec![(1, phy_reg::ANAR, 0x0181), (1, phy_reg::BMCR, bmcr::AN_ENABLE)]
        );
    }

    #[test]
    fn init_without_phy_uses_default_address() {
        let mut ring = RxRing::<NoStats, 4>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();
        let config = RmiiConfig::new().with_advertise_10mbps(true);

        let mut eth = RmiiEthernet::new(config, &UID, MockMdioBus::new(), consumer, tx, &clock).unwrap();
        eth.init().unwrap();

        assert_eq!(eth.phy_address(), 0);
        assert_eq!(eth.mdio_mut().get_register(0, phy_reg::ANAR), Some(0x01E1));
    }

    #[test]
    fn link_service_reports_edges() {
        let mut ring = RxRing::<NoStats, 4>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();
        let mdio = MockMdioBus::new();
        mdio.setup_phy(0);
        mdio.set_link(0, true);

        let config = RmiiConfig::new()
            .with_link_poll_interval_us(1_000)
            .with_rx_wait_timeout_us(10);
        let mut eth = RmiiEthernet::new(config, &UID, mdio, consumer, tx, &clock).unwrap();

        assert_eq!(eth.poll_link(), Some(LinkEvent::Up));
        assert!(eth.is_link_up());
        assert_eq!(eth.poll_link(), None);

        eth.mdio_mut().set_link(0, false);
        clock.advance(999);
        assert_eq!(eth.poll_link(), None);
        clock.advance(1);
        assert_eq!(eth.poll_link(), Some(LinkEvent::Down));
        assert!(!eth.is_link_up());
        assert_eq!(eth.read_phy_reg(phy_reg::BMSR).map(|v| v & bmsr::LINK_STATUS), Ok(0));
    }

    #[test]
    fn poll_round_delivers_and_services_timers() {
        let clock = MockClock::auto(5);
        let mut ring = RxRing::<Counters<&MockClock>, 4>::new(Counters::new(&clock));
        let capture = MockCapture::new();
        let (mut producer, consumer) = ring.split(Capture::Single(capture.clone()));
        producer.start();
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let mdio = MockMdioBus::new();
        mdio.setup_phy(0);
        mdio.set_link(0, true);

        let config = RmiiConfig::new().with_rx_wait_timeout_us(1_000);
        let mut eth = RmiiEthernet::new(config, &UID, mdio, consumer, tx, &clock).unwrap();
        let mut host = MockStack::new();

        capture.deliver(&numbered_frame(3, 100));
        producer.on_interrupt();

        assert_eq!(eth.poll(&mut host), RxOutcome::Delivered(100));
        assert_eq!(host.link_ups, 1);
        assert_eq!(host.timer_runs, 1);
        assert_eq!(host.delivered, [numbered_frame(3, 100)[..100].to_vec()]);

        assert_eq!(eth.poll(&mut host), RxOutcome::Idle);
        assert_eq!(host.link_ups, 1);
        assert_eq!(host.timer_runs, 2);

        eth.transmit(&[0x55; 60]);
        assert_eq!(eth.stats().total(Counter::RxOk), 1);
        assert_eq!(eth.stats().total(Counter::TxOk), 1);
    }

    #[test]
    fn dual_capture_config_accepted() {
        let mut ring = RxRing::<NoStats, 8>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Dual(MockCapture::new(), MockCapture::new()));
        assert_eq!(consumer.capture_mode(), CaptureMode::Dual);
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let clock = MockClock::new();

        let config = RmiiConfig::new().with_capture_mode(CaptureMode::Dual);
        let eth = RmiiEthernet::new(config, &UID, MockMdioBus::new(), consumer, tx, &clock).unwrap();
        assert_eq!(eth.config().capture_mode, CaptureMode::Dual);
    }

    #[test]
    fn capture_mode_must_match_ring() {
        let clock = MockClock::new();

        let mut ring = RxRing::<NoStats, 8>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Dual(MockCapture::new(), MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let result = RmiiEthernet::new(RmiiConfig::new(), &UID, MockMdioBus::new(), consumer, tx, &clock);
        assert_eq!(result.err(), Some(ConfigError::CaptureModeMismatch));

        let mut ring = RxRing::<NoStats, 8>::new(NoStats);
        let (_producer, consumer) = ring.split(Capture::Single(MockCapture::new()));
        let mut scratch = TxBuffer::new();
        let tx = Transmitter::new(MockTransmit::new(), &mut scratch, consumer.stats());
        let config = RmiiConfig::new().with_capture_mode(CaptureMode::Dual);
        let result = RmiiEthernet::new(config, &UID, MockMdioBus::new(), consumer, tx, &clock);
        assert_eq!(result.err(), Some(ConfigError::CaptureModeMismatch));
    }
}
