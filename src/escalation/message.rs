//! Alert message text sent to contacts.

use core::fmt::Write;

use super::alert::{AlertType, EmergencyAlert};

/// Compose the notification body for `alert`.
pub fn compose(alert: &EmergencyAlert) -> String {
    let name = alert.context.subject_name.as_deref().unwrap_or("Unknown");
    let mut msg = String::with_capacity(256);

    // Writing into a String cannot fail.
    let _ = match alert.alert_type {
        AlertType::HealthEmergency => write!(
            msg,
            "CRITICAL HEALTH ALERT for {name}!\n\nCritical vital signs detected:\n"
        ),
        AlertType::FallDetected => write!(
            msg,
            "FALL DETECTED for {name}!\n\nA fall was detected and not answered.\n"
        ),
        AlertType::ManualSos => write!(
            msg,
            "EMERGENCY ALERT from {name}!\n\nSOS button activated.\n"
        ),
    };

    if let Some(v) = &alert.context.vitals {
        let _ = writeln!(msg, "Heart Rate: {} bpm", v.heart_rate);
        let _ = writeln!(msg, "Blood Pressure: {}/{} mmHg", v.systolic, v.diastolic);
        let _ = writeln!(msg, "Oxygen: {}%", v.spo2);
        let _ = writeln!(msg, "Temperature: {:.1}°C", v.temperature_c);
    }

    if let Some(loc) = &alert.context.location {
        let _ = writeln!(
            msg,
            "\nLocation: https://maps.google.com/?q={},{}",
            loc.latitude, loc.longitude
        );
    }

    let _ = write!(msg, "\nAlert {}. Please check on them immediately!", alert.id);
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::alert::{AlertContext, AlertId, Location, SubjectId};
    use crate::telemetry::{ActivityLevel, VitalReading};

    fn alert(alert_type: AlertType, context: AlertContext) -> EmergencyAlert {
        EmergencyAlert::new(AlertId(3), SubjectId(1), alert_type, context, 0)
    }

    #[test]
    fn sos_without_context() {
        let m = compose(&alert(AlertType::ManualSos, AlertContext::default()));
        assert!(m.starts_with("EMERGENCY ALERT from Unknown!"));
        assert!(m.contains("SOS button activated."));
        assert!(m.ends_with("Alert ALR-000003. Please check on them immediately!"));
        assert!(!m.contains("Location"));
    }

    #[test]
    fn health_alert_lists_vitals_and_location() {
        let ctx = AlertContext {
            subject_name: Some("Ada".into()),
            location: Some(Location {
                latitude: 51.5,
                longitude: -0.12,
            }),
            vitals: Some(VitalReading {
                heart_rate: 188,
                systolic: 190,
                diastolic: 112,
                temperature_c: 38.4,
                spo2: 88,
                activity: ActivityLevel::Rest,
                timestamp_ms: 0,
            }),
        };
        let m = compose(&alert(AlertType::HealthEmergency, ctx));
        assert!(m.starts_with("CRITICAL HEALTH ALERT for Ada!"));
        assert!(m.contains("Heart Rate: 188 bpm"));
        assert!(m.contains("Blood Pressure: 190/112 mmHg"));
        assert!(m.contains("Oxygen: 88%"));
        assert!(m.contains("Temperature: 38.4°C"));
        assert!(m.contains("https://maps.google.com/?q=51.5,-0.12"));
    }

    #[test]
    fn fall_headline() {
        let m = compose(&alert(AlertType::FallDetected, AlertContext::default()));
        assert!(m.starts_with("FALL DETECTED for Unknown!"));
    }
}
