//! Wire encoding of race events
//!
//! One JSON object per event:
//! ```text
//! {"id":7,"eventTime":"2024-10-05T09:31:02Z","dataType":"finish",
//!  "data":{"source":"mat-a","bib":10,"finishTime":"2024-10-05T09:31:02Z"}}
//! ```
//! `id` is informational on read: the log position is authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use race_types::{EventData, EventId, FinishEvent, PlaceEvent, RaceEvent, StartEvent};

use crate::error::StreamError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(default)]
    id: EventId,
    event_time: DateTime<Utc>,
    data_type: String,
    data: serde_json::Value,
}

/// Encode an event into a single-line JSON frame
pub fn encode_event(event: &RaceEvent) -> Result<Vec<u8>, StreamError> {
    let data = match &event.data {
        EventData::Start(e) => serde_json::to_value(e),
        EventData::Finish(e) => serde_json::to_value(e),
        EventData::Place(e) => serde_json::to_value(e),
    }
    .map_err(|e| StreamError::Encode(e.to_string()))?;

    let wire = WireEvent {
        id: event.id,
        event_time: event.event_time,
        data_type: event.type_label().to_string(),
        data,
    };
    serde_json::to_vec(&wire).map_err(|e| StreamError::Encode(e.to_string()))
}

/// Decode a frame stored at log position `id`
pub fn decode_event(id: EventId, frame: &[u8]) -> Result<RaceEvent, StreamError> {
    let decode_err = |e: serde_json::Error| StreamError::Decode {
        id,
        reason: e.to_string(),
    };

    let wire: WireEvent = serde_json::from_slice(frame).map_err(decode_err)?;
    let data = match wire.data_type.as_str() {
        "start" => EventData::Start(serde_json::from_value::<StartEvent>(wire.data).map_err(decode_err)?),
        "finish" => EventData::Finish(serde_json::from_value::<FinishEvent>(wire.data).map_err(decode_err)?),
        "place" => EventData::Place(serde_json::from_value::<PlaceEvent>(wire.data).map_err(decode_err)?),
        other => {
            return Err(StreamError::Decode {
                id,
                reason: format!("unknown data type '{}'", other),
            })
        }
    };

    Ok(RaceEvent {
        id,
        event_time: wire.event_time,
        data,
    })
}
