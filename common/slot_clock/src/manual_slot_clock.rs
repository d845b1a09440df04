use super::SlotClock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use types::Slot;

/// A slot clock where the current time is fixed until explicitly updated.
///
/// Used for testing and as the arithmetic core of `SystemTimeSlotClock`.
#[derive(Clone)]
pub struct ManualSlotClock {
    genesis_slot: Slot,
    /// Duration from UNIX epoch to genesis.
    genesis_duration: Duration,
    /// Duration from UNIX epoch to right now.
    current_time: Arc<RwLock<Duration>>,
    /// The length of each slot.
    slot_duration: Duration,
}

impl ManualSlotClock {
    pub fn set_slot(&self, slot: u64) {
        let slots_since_genesis = slot
            .checked_sub(self.genesis_slot.as_u64())
            .expect("slot must be post-genesis")
            .try_into()
            .expect("slot must fit within a u32");
        *self.current_time.write() =
            self.genesis_duration + self.slot_duration * slots_since_genesis;
    }

    pub fn set_current_time(&self, duration: Duration) {
        *self.current_time.write() = duration;
    }

    pub fn advance_time(&self, duration: Duration) {
        let current_time = *self.current_time.read();
        *self.current_time.write() = current_time + duration;
    }

    pub fn advance_slot(&self) {
        self.set_slot(self.now().expect("clock is post-genesis").as_u64() + 1)
    }

    pub fn duration_to_next_slot_of(&self, now: Duration) -> Option<Duration> {
        let genesis = self.genesis_duration;

        let slot_start = |slot: Slot| -> Duration {
            let slot = slot.as_u64() as u32;
            genesis + slot * self.slot_duration
        };

        if now >= genesis {
            let slot = self.slot_of(now)?;
            let slot_start = slot_start(slot + 1);
            slot_start.checked_sub(now)
        } else {
            genesis.checked_sub(now)
        }
    }
}

impl SlotClock for ManualSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        if slot_duration.as_millis() == 0 {
            panic!("ManualSlotClock cannot have a < 1ms slot duration");
        }

        Self {
            genesis_slot,
            current_time: Arc::new(RwLock::new(genesis_duration)),
            genesis_duration,
            slot_duration,
        }
    }

    fn now(&self) -> Option<Slot> {
        self.slot_of(*self.current_time.read())
    }

    fn is_prior_to_genesis(&self) -> Option<bool> {
        Some(*self.current_time.read() < self.genesis_duration)
    }

    fn now_duration(&self) -> Option<Duration> {
        Some(*self.current_time.read())
    }

    fn slot_of(&self, now: Duration) -> Option<Slot> {
        let genesis = self.genesis_duration;

        if now >= genesis {
            let since_genesis = now
                .checked_sub(genesis)
                .expect("now is greater than or equal to genesis");
            let slot =
                Slot::from((since_genesis.as_millis() / self.slot_duration.as_millis()) as u64);
            Some(slot + self.genesis_slot)
        } else {
            None
        }
    }

    fn duration_to_next_slot(&self) -> Option<Duration> {
        self.duration_to_next_slot_of(*self.current_time.read())
    }

    fn duration_to_next_epoch(&self, slots_per_epoch: u64) -> Option<Duration> {
        let now = *self.current_time.read();
        let current_slot = self.slot_of(now)?;
        let start_of_next_epoch = {
            let epoch_start_slot = current_slot
                .epoch(slots_per_epoch)
                .start_slot(slots_per_epoch);
            epoch_start_slot + slots_per_epoch
        };
        self.start_of(start_of_next_epoch)?.checked_sub(now)
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    fn duration_to_slot(&self, slot: Slot) -> Option<Duration> {
        self.start_of(slot)?
            .checked_sub(*self.current_time.read())
    }

    fn start_of(&self, slot: Slot) -> Option<Duration> {
        let slot = slot
            .as_u64()
            .checked_sub(self.genesis_slot.as_u64())?
            .try_into()
            .ok()?;
        let unadjusted_slot_duration = self
            .slot_duration
            .checked_mul(slot)?;

        self.genesis_duration.checked_add(unadjusted_slot_duration)
    }

    fn genesis_slot(&self) -> Slot {
        self.genesis_slot
    }

    fn genesis_duration(&self) -> Duration {
        self.genesis_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_now() {
        let clock = ManualSlotClock::new(
            Slot::new(10),
            Duration::from_secs(0),
            Duration::from_secs(1),
        );
        assert_eq!(clock.now(), Some(Slot::new(10)));

        clock.set_slot(123);
        assert_eq!(clock.now(), Some(Slot::new(123)));
    }

    #[test]
    fn test_durations() {
        let clock = ManualSlotClock::new(
            Slot::new(0),
            Duration::from_secs(100),
            Duration::from_secs(12),
        );

        assert_eq!(clock.start_of(Slot::new(0)), Some(Duration::from_secs(100)));
        assert_eq!(clock.start_of(Slot::new(2)), Some(Duration::from_secs(124)));

        // Pre-genesis, the whole time to genesis remains.
        assert_eq!(
            clock.duration_to_next_slot(),
            Some(Duration::from_secs(12))
        );

        clock.set_current_time(Duration::from_secs(121));
        assert_eq!(clock.now(), Some(Slot::new(1)));
        assert_eq!(clock.duration_to_next_slot(), Some(Duration::from_secs(3)));
        assert_eq!(
            clock.duration_to_slot(Slot::new(10)),
            Some(Duration::from_secs(100 + 120 - 121))
        );
    }

    #[test]
    fn test_epoch_boundary() {
        let clock = ManualSlotClock::new(
            Slot::new(0),
            Duration::from_secs(0),
            Duration::from_secs(12),
        );
        clock.set_slot(5);
        // 32 slots per epoch: next epoch starts at slot 32.
        assert_eq!(
            clock.duration_to_next_epoch(32),
            Some(Duration::from_secs(27 * 12))
        );
    }
}
