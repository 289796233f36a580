//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `config_file`  | ConfigPort         | JSON file                   |
//! | `contact_book` | ContactDirectory   | In-memory / JSON file       |
//! | `console`      | NotificationSink   | Log output (SMS stand-in)   |
//! |                | AlarmPort          | Log output (buzzer stand-in)|
//! | `local`        | all driven ports   | Bundles the above           |
//! | `log_sink`     | EventSink          | Log output                  |
//! | `record_log`   | PersistenceSink    | Framed postcard stream      |
//! | `time`         | Clock              | `Instant` / manual stepping |

pub mod config_file;
pub mod console;
pub mod contact_book;
pub mod local;
pub mod log_sink;
pub mod record_log;
pub mod time;
