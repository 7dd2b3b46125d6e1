#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_precision_loss,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::return_self_not_must_use,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

//! tgvault — archive media from unread messages across your Telegram channels.
//!
//! The library is organized around one sequential pipeline:
//! [`session::MediaArchiver`] enumerates channels, [`session::ChannelProcessor`]
//! turns each channel's unread messages into a [`session::ChannelStats`], and
//! [`session::MediaFetcher`] resolves individual messages to files on disk.
//! The Telegram transport itself sits behind the [`client::TelegramClient`]
//! trait; [`client::GatewayClient`] is the bundled HTTP implementation that
//! talks to a local MTProto gateway.

pub mod client;
pub mod config;
pub mod filters;
pub mod namers;
pub mod report;
pub mod session;
pub(crate) mod util;

pub use client::{ChannelInfo, GatewayClient, MediaPayload, Message, TelegramClient};
pub use config::Config;
pub use filters::{DefaultMediaFilter, FilterKind, ImageOnlyFilter, MediaFilter, VideoOnlyFilter};
pub use namers::{ChannelPrefixNamer, FileNamer, NamerKind, TimestampNamer};
pub use session::{ChannelStats, DownloadSession, MediaArchiver, MediaRecord};
