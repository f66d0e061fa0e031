//! Shared-bus handle for one physical I2C peripheral carrying several
//! logical devices at different addresses and clock rates.
//!
//! Each device gets an [`I2cPort`] holding that device's bus configuration.
//! Before every transaction the port locks the bus, swaps the active
//! configuration for its own, and executes — so the configure-then-transact
//! pair is atomic with respect to every other port on the same bus. Without
//! the lock, device Y could reconfigure the peripheral between device X's
//! configure and X's transfer, which is a correctness bug rather than a
//! performance problem.
//!
//! The bus type only needs to implement [`embedded_hal::i2c::I2c`] plus
//! [`SetConfig`], so ports work against a real peripheral or a host-side
//! fake identically.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

use core::cell::RefCell;

use embassy_embedded_hal::SetConfig;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

/// Error type for port transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError<E> {
    /// The underlying bus rejected the transfer.
    Bus(E),
    /// The bus rejected this port's configuration.
    Config,
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for PortError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            PortError::Bus(e) => e.kind(),
            PortError::Config => ErrorKind::Other,
        }
    }
}

/// One physical I2C peripheral, lockable by many logical devices.
pub struct SharedI2c<M: RawMutex, BUS> {
    bus: Mutex<M, RefCell<BUS>>,
}

impl<M: RawMutex, BUS> SharedI2c<M, BUS> {
    /// Take ownership of the physical bus.
    pub fn new(bus: BUS) -> Self {
        Self {
            bus: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Create a port for one device on the bus. `config` is applied under
    /// the bus lock immediately before each of this port's transactions.
    pub fn port(&self, config: BUS::Config) -> I2cPort<'_, M, BUS>
    where
        BUS: SetConfig,
    {
        I2cPort { shared: self, config }
    }

    /// Run `f` with exclusive access to the raw bus.
    pub fn with_bus<R>(&self, f: impl FnOnce(&mut BUS) -> R) -> R {
        self.bus.lock(|bus| f(&mut bus.borrow_mut()))
    }
}

/// A logical device's handle onto a [`SharedI2c`].
///
/// Implements [`I2c`], so any driver generic over `embedded-hal` can sit on
/// a port without knowing the bus is shared.
pub struct I2cPort<'a, M: RawMutex, BUS: SetConfig> {
    shared: &'a SharedI2c<M, BUS>,
    config: BUS::Config,
}

impl<M: RawMutex, BUS> ErrorType for I2cPort<'_, M, BUS>
where
    BUS: ErrorType + SetConfig,
{
    type Error = PortError<BUS::Error>;
}

impl<M: RawMutex, BUS> I2c for I2cPort<'_, M, BUS>
where
    BUS: I2c + SetConfig,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.shared.bus.lock(|bus| {
            let bus = &mut *bus.borrow_mut();
            bus.set_config(&self.config)
                .map_err(|_| PortError::Config)?;
            bus.transaction(address, operations)
                .map_err(PortError::Bus)
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec::Vec;

    /// What the fake bus saw: which configuration was live when a
    /// transaction for `address` executed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Seen {
        clock_hz: u32,
        address: u8,
        writes: usize,
        reads: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FakeError;

    impl embedded_hal::i2c::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[derive(Default)]
    struct FakeBus {
        clock_hz: u32,
        seen: Vec<Seen>,
        reject_config: bool,
    }

    impl ErrorType for FakeBus {
        type Error = FakeError;
    }

    impl SetConfig for FakeBus {
        type Config = u32;
        type ConfigError = ();

        fn set_config(&mut self, config: &u32) -> Result<(), ()> {
            if self.reject_config {
                return Err(());
            }
            self.clock_hz = *config;
            Ok(())
        }
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let writes = operations
                .iter()
                .filter(|op| matches!(op, Operation::Write(_)))
                .count();
            self.seen.push(Seen {
                clock_hz: self.clock_hz,
                address,
                writes,
                reads: operations.len() - writes,
            });
            Ok(())
        }
    }

    #[test]
    fn test_each_transaction_runs_under_own_config() {
        let shared: SharedI2c<NoopRawMutex, FakeBus> = SharedI2c::new(FakeBus::default());
        let mut eeprom_port = shared.port(100_000);
        let mut lcd_port = shared.port(400_000);

        eeprom_port.write(0x50, &[0x00]).unwrap();
        lcd_port.write(0x27, &[0x08]).unwrap();
        eeprom_port.write_read(0x50, &[0x00], &mut [0u8; 2]).unwrap();

        let seen = shared.with_bus(|bus| bus.seen.clone());
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].clock_hz, 100_000);
        assert_eq!(seen[0].address, 0x50);
        assert_eq!(seen[1].clock_hz, 400_000);
        assert_eq!(seen[1].address, 0x27);
        // Interleaving back to the first device re-applies its clock.
        assert_eq!(seen[2].clock_hz, 100_000);
        assert_eq!(seen[2], Seen { clock_hz: 100_000, address: 0x50, writes: 1, reads: 1 });
    }

    #[test]
    fn test_rejected_config_fails_before_transfer() {
        let shared: SharedI2c<NoopRawMutex, FakeBus> = SharedI2c::new(FakeBus {
            reject_config: true,
            ..FakeBus::default()
        });
        let mut port = shared.port(100_000);
        assert_eq!(port.write(0x50, &[0]), Err(PortError::Config));
        // The transfer itself never reached the bus.
        assert_eq!(shared.with_bus(|bus| bus.seen.len()), 0);
    }
}
