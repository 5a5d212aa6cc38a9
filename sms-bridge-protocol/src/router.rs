//! Message Box Routing
//!
//! The SMS content store is split into four containers. The host's message
//! kind enumeration is finer on the outbound side than the store, so pending,
//! sending and failed messages all land in the outbox.
//!
//! | kind | box |
//! |------|--------|
//! | 0 | Sent |
//! | 1 | Inbox |
//! | 2 | Draft |
//! | 3, 4, 5 | Outbox |
//! | other | Inbox |

use std::fmt;

/// Destination container in the SMS content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageBox {
    Sent,
    Inbox,
    Draft,
    Outbox,
}

impl MessageBox {
    /// Select the destination box for a host message kind
    ///
    /// Unknown kinds fall back to the inbox so that newer host values still
    /// get stored.
    ///
    /// ```rust
    /// use sms_bridge_protocol::MessageBox;
    ///
    /// assert_eq!(MessageBox::for_kind(0), MessageBox::Sent);
    /// assert_eq!(MessageBox::for_kind(4), MessageBox::Outbox);
    /// assert_eq!(MessageBox::for_kind(99), MessageBox::Inbox);
    /// ```
    pub fn for_kind(kind: i32) -> Self {
        match kind {
            0 => Self::Sent,
            1 => Self::Inbox,
            2 => Self::Draft,
            3..=5 => Self::Outbox,
            _ => Self::Inbox,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Inbox => "inbox",
            Self::Draft => "draft",
            Self::Outbox => "outbox",
        }
    }

    /// Container URI, e.g. `content://sms/sent`
    pub fn content_uri(&self) -> String {
        format!("content://sms/{}", self.as_str())
    }

    /// The provider's `type` column value for rows in this box
    pub fn type_code(&self) -> i32 {
        match self {
            Self::Inbox => 1,
            Self::Sent => 2,
            Self::Draft => 3,
            Self::Outbox => 4,
        }
    }
}

impl fmt::Display for MessageBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content_uri())
    }
}
