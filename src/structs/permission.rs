use bitflags::bitflags;

bitflags! {
    /// Capabilities a role can grant.
    ///
    /// Stored as an INTEGER column; bits unknown to this build are dropped on load.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Permission: u32 {
        /// Follow other users
        const FOLLOW   = 1;
        /// Comment on posts
        const COMMENT  = 2;
        /// Write articles
        const WRITE    = 4;
        /// Moderate comments made by others
        const MODERATE = 8;
        /// Administration access
        const ADMIN    = 16;
    }
}

impl Permission {
    /// Builds a mask from a stored column value.
    pub fn from_db(value: i32) -> Self {
        Self::from_bits_truncate(value as u32)
    }

    pub fn to_db(self) -> i32 {
        self.bits() as i32
    }

    /// Every single flag, lowest bit first.
    pub fn flags() -> impl Iterator<Item = Permission> {
        Self::all().iter()
    }
}
