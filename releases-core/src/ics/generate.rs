//! ICS document generation.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Property, ValueType};

use crate::event::ReleaseEvent;
use crate::time::ReleaseTime;

const PRODID: &str = "-//releases-ical//data releases//EN";

/// Generate the .ics text for a set of release events.
///
/// `dtstamp` is written to every event's DTSTAMP.
pub fn generate_ics(name: &str, events: &[ReleaseEvent], dtstamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::new();
    cal.name(name);

    for event in events {
        cal.push(build_event(event, dtstamp));
    }

    let cal = cal.done();

    strip_ics_bloat(&cal.to_string())
}

fn build_event(event: &ReleaseEvent, dtstamp: DateTime<Utc>) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.summary);

    // DTSTAMP - required by RFC 5545
    ics_event.add_property("DTSTAMP", dtstamp.format("%Y%m%dT%H%M%SZ").to_string());

    add_datetime_property(&mut ics_event, "DTSTART", &event.start);

    ics_event.add_property("URL", &event.url);

    // A publisher has a name but no address, so it goes in as a bare value
    ics_event.add_property("ORGANIZER", &event.organizer);

    let mut contact = Property::new("CONTACT", event.contact.mailto());
    contact.add_parameter("CN", &event.contact.name);
    ics_event.append_property(contact);

    ics_event.description(&event.description);

    ics_event.done()
}

/// Swap the library's PRODID for ours and drop the redundant
/// `CALSCALE:GREGORIAN` line. Output lines end in CRLF.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Write `name` as an all-day date, a UTC instant or a floating local time,
/// matching the precision of the release date.
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &ReleaseTime) {
    match time {
        ReleaseTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        ReleaseTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
        ReleaseTime::DateTimeFloating(dt) => {
            // No Z, no TZID
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
    }
}
