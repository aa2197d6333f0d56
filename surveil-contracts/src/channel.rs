//! Dispatch channel bitmask shared by the alert lifecycle engine and the
//! channel router (C5, C6).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of dispatch channels, encoded as four independent bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const IN_APP: ChannelMask = ChannelMask(0b0001);
    pub const EMAIL: ChannelMask = ChannelMask(0b0010);
    pub const WECHAT: ChannelMask = ChannelMask(0b0100);
    pub const SMS: ChannelMask = ChannelMask(0b1000);
    pub const NONE: ChannelMask = ChannelMask(0);
    pub const ALL: ChannelMask = ChannelMask(0b1111);

    /// All individually addressable channels, in dispatch-topic order.
    const MEMBERS: [(ChannelMask, &'static str); 4] = [
        (ChannelMask::IN_APP, "in_app"),
        (ChannelMask::EMAIL, "email"),
        (ChannelMask::WECHAT, "wechat"),
        (ChannelMask::SMS, "sms"),
    ];

    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(ChannelMask(bits))
        } else {
            None
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ChannelMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: ChannelMask) -> ChannelMask {
        ChannelMask(self.0 | other.0)
    }

    /// Channels set in this mask, paired with the topic suffix each one
    /// dispatches to (`alert.dispatch.{suffix}`).
    pub fn channels(self) -> impl Iterator<Item = (ChannelMask, &'static str)> {
        Self::MEMBERS.into_iter().filter(move |(bit, _)| self.contains(*bit))
    }
}

impl BitOr for ChannelMask {
    type Output = ChannelMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for ChannelMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.channels().map(|(_, name)| name)).finish()
    }
}
