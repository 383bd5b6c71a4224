use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::config::{LIVE_DETAIL_SEPARATOR, UNKNOWN_TEAM};
use crate::types::{GameSnapshot, GameStatus};

static MALFORMED_EVENTS: AtomicU64 = AtomicU64::new(0);

// Every leaf below decodes leniently: a field of the wrong JSON type reads as
// absent and takes its default, instead of failing the whole event.

/// `status.type` on an event or competition.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawStatusType {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawStatus {
    #[serde(rename = "clockDisplayValue", default, deserialize_with = "lenient")]
    pub clock_display_value: Option<String>,
    /// Integer in practice; numeric strings and whole floats are accepted.
    #[serde(default)]
    pub period: Option<Value>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<RawStatusType>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawTeam {
    #[serde(rename = "displayName", default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawCompetitor {
    /// "home" or "away".
    #[serde(rename = "homeAway", default, deserialize_with = "lenient")]
    pub home_away: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub team: Option<RawTeam>,
    /// Usually a decimal string, occasionally a bare number.
    #[serde(default)]
    pub score: Option<Value>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawCompetition {
    #[serde(default, deserialize_with = "lenient_list")]
    pub competitors: Vec<RawCompetitor>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<RawStatus>,
}

/// One entry of the scoreboard `events` array. Every field is optional;
/// defaults are applied in [`classify_event`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<RawStatus>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub competitions: Vec<RawCompetition>,
}

/// Decodes `T` if the value has the right shape, `None` otherwise.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(|v| T::deserialize(v).ok()))
}

/// Keeps the array items that decode as `T`; a non-array is an empty list.
fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Outcome of running one raw event through the live-game filter.
#[derive(Debug)]
pub enum EventDisposition {
    Live(GameSnapshot),
    /// Status name is the terminal value.
    Final,
    /// Status detail lacks the in-progress separator (scheduled, halftime, ...).
    NotLive,
    /// Not an object of the expected shape, or no competition to read.
    Malformed,
}

/// Decode one `events[]` entry and apply the live filter. `index` is the
/// entry's position in the array and stands in for a missing id.
///
/// A game is live when its status name is not final AND the first
/// competition's status detail contains " - ".
pub fn classify_event(index: usize, raw: &Value) -> EventDisposition {
    let event = match RawEvent::deserialize(raw) {
        Ok(e) => e,
        Err(e) => {
            note_malformed(&format!("decode failed: {e}"));
            return EventDisposition::Malformed;
        }
    };
    let Some(comp) = event.competitions.first() else {
        note_malformed("event has no competitions");
        return EventDisposition::Malformed;
    };

    let event_type = event.status.as_ref().and_then(|s| s.kind.as_ref());
    let comp_type = comp.status.as_ref().and_then(|s| s.kind.as_ref());

    let status_name = event_type
        .and_then(|t| t.name.as_deref())
        .or_else(|| comp_type.and_then(|t| t.name.as_deref()))
        .unwrap_or_default();
    let status = GameStatus::from_name(status_name);
    if status.is_final() {
        return EventDisposition::Final;
    }

    let detail = comp_type
        .and_then(|t| t.detail.as_deref())
        .unwrap_or_default();
    if !detail.contains(LIVE_DETAIL_SEPARATOR) {
        return EventDisposition::NotLive;
    }

    EventDisposition::Live(to_snapshot(index, &event, comp, status, detail))
}

fn to_snapshot(
    index: usize,
    event: &RawEvent,
    comp: &RawCompetition,
    status: GameStatus,
    detail: &str,
) -> GameSnapshot {
    let home = find_side(comp, "home");
    let away = find_side(comp, "away");

    // Competition status is authoritative; the event-level copy fills gaps.
    let comp_status = comp.status.as_ref();
    let event_status = event.status.as_ref();
    let clock = comp_status
        .and_then(|s| s.clock_display_value.clone())
        .or_else(|| event_status.and_then(|s| s.clock_display_value.clone()));
    let period = comp_status
        .and_then(|s| parse_period(s.period.as_ref()))
        .or_else(|| event_status.and_then(|s| parse_period(s.period.as_ref())))
        .unwrap_or(1);

    GameSnapshot {
        id: event
            .id
            .as_ref()
            .and_then(id_string)
            .unwrap_or_else(|| format!("event-{index}")),
        home_team: team_name(home),
        away_team: team_name(away),
        home_score: home.map_or(0, |c| parse_score(c.score.as_ref())),
        away_score: away.map_or(0, |c| parse_score(c.score.as_ref())),
        clock,
        period,
        status_detail: detail.to_string(),
        status,
    }
}

fn find_side<'a>(comp: &'a RawCompetition, side: &str) -> Option<&'a RawCompetitor> {
    comp.competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some(side))
}

fn team_name(c: Option<&RawCompetitor>) -> String {
    c.and_then(|c| c.team.as_ref())
        .and_then(|t| t.display_name.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_TEAM)
        .to_string()
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Period number from an integer, a whole float ("2.0") or a numeric string
/// ("2"). Anything else is `None` and defaults upstream.
fn parse_period(v: Option<&Value>) -> Option<u32> {
    match v? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|x| x.is_finite() && *x >= 0.0 && x.fract() == 0.0)
                    .map(|x| x as u64)
            })
            .and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Score as an integer. Strings parse their leading digits ("72" → 72,
/// " 9 " → 9, "12pts" → 12); anything else is 0.
pub fn parse_score(v: Option<&Value>) -> u32 {
    match v {
        Some(Value::String(s)) => {
            let s = s.trim_start();
            let digits: &str = &s[..s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())];
            digits.parse::<u32>().unwrap_or(0)
        }
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|x| x.min(u64::from(u32::MAX)) as u32)
            .or_else(|| n.as_f64().filter(|x| x.is_finite() && *x > 0.0).map(|x| x as u32))
            .unwrap_or(0),
        _ => 0,
    }
}

fn note_malformed(reason: &str) {
    let count = MALFORMED_EVENTS.fetch_add(1, Ordering::Relaxed) + 1;
    if count <= 10 || count % 1000 == 0 {
        warn!(count, "[SCOREBOARD] skipping malformed event: {reason}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live_event() -> Value {
        json!({
            "id": "401638580",
            "status": { "type": { "name": "STATUS_IN_PROGRESS", "detail": "8:45 - 2nd Half" } },
            "competitions": [{
                "competitors": [
                    { "homeAway": "home", "team": { "displayName": "Kansas Jayhawks" }, "score": "72" },
                    { "homeAway": "away", "team": { "displayName": "Baylor Bears" }, "score": "68" }
                ],
                "status": {
                    "clockDisplayValue": "8:45",
                    "period": 2,
                    "type": { "name": "STATUS_IN_PROGRESS", "detail": "8:45 - 2nd Half" }
                }
            }]
        })
    }

    #[test]
    fn live_event_normalizes() {
        match classify_event(0, &live_event()) {
            EventDisposition::Live(g) => {
                assert_eq!(g.id, "401638580");
                assert_eq!(g.home_team, "Kansas Jayhawks");
                assert_eq!(g.away_team, "Baylor Bears");
                assert_eq!(g.home_score, 72);
                assert_eq!(g.away_score, 68);
                assert_eq!(g.clock.as_deref(), Some("8:45"));
                assert_eq!(g.period, 2);
                assert_eq!(g.status_detail, "8:45 - 2nd Half");
                assert_eq!(g.status, GameStatus::InProgress);
            }
            other => panic!("expected Live, got {other:?}"),
        }
    }

    #[test]
    fn final_is_excluded_regardless_of_detail() {
        let mut ev = live_event();
        ev["status"]["type"]["name"] = json!("STATUS_FINAL");
        assert!(matches!(classify_event(0, &ev), EventDisposition::Final));
    }

    #[test]
    fn detail_without_separator_is_not_live() {
        let mut ev = live_event();
        ev["competitions"][0]["status"]["type"]["detail"] = json!("Halftime");
        assert!(matches!(classify_event(0, &ev), EventDisposition::NotLive));

        ev["competitions"][0]["status"]["type"]["detail"] = json!("Sat, March 15th at 7:00 PM EDT");
        assert!(matches!(classify_event(0, &ev), EventDisposition::NotLive));
    }

    #[test]
    fn missing_scores_and_competitor_default() {
        let ev = json!({
            "id": "1",
            "status": { "type": { "name": "STATUS_IN_PROGRESS" } },
            "competitions": [{
                "competitors": [
                    { "homeAway": "home", "team": { "displayName": "Gonzaga Bulldogs" } }
                ],
                "status": { "period": 1, "type": { "detail": "12:00 - 1st Half" } }
            }]
        });
        match classify_event(0, &ev) {
            EventDisposition::Live(g) => {
                assert_eq!(g.home_score, 0);
                assert_eq!(g.away_score, 0);
                assert_eq!(g.away_team, "Unknown");
                assert!(g.clock.is_none());
            }
            other => panic!("expected Live, got {other:?}"),
        }
    }

    #[test]
    fn missing_period_defaults_to_first_half() {
        let mut ev = live_event();
        ev["competitions"][0]["status"]
            .as_object_mut()
            .unwrap()
            .remove("period");
        match classify_event(0, &ev) {
            EventDisposition::Live(g) => assert_eq!(g.period, 1),
            other => panic!("expected Live, got {other:?}"),
        }
    }

    #[test]
    fn no_competitions_is_malformed() {
        let ev = json!({ "id": "2", "status": { "type": { "name": "STATUS_IN_PROGRESS" } } });
        assert!(matches!(classify_event(0, &ev), EventDisposition::Malformed));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(matches!(classify_event(0, &json!("nope")), EventDisposition::Malformed));
        assert!(matches!(
            classify_event(0, &json!({ "competitions": "not-an-array" })),
            EventDisposition::Malformed
        ));
    }

    #[test]
    fn numeric_id_is_stringified() {
        let mut ev = live_event();
        ev["id"] = json!(401638581);
        match classify_event(0, &ev) {
            EventDisposition::Live(g) => assert_eq!(g.id, "401638581"),
            other => panic!("expected Live, got {other:?}"),
        }
    }

    fn live_snapshot(ev: &Value) -> GameSnapshot {
        match classify_event(0, ev) {
            EventDisposition::Live(g) => g,
            other => panic!("expected Live, got {other:?}"),
        }
    }

    #[test]
    fn mistyped_period_is_coerced() {
        let mut ev = live_event();
        ev["competitions"][0]["status"]["period"] = json!("2");
        assert_eq!(live_snapshot(&ev).period, 2);

        ev["competitions"][0]["status"]["period"] = json!(2.0);
        assert_eq!(live_snapshot(&ev).period, 2);

        ev["competitions"][0]["status"]["period"] = json!("second");
        assert_eq!(live_snapshot(&ev).period, 1);

        ev["competitions"][0]["status"]["period"] = json!(1.5);
        assert_eq!(live_snapshot(&ev).period, 1);
    }

    #[test]
    fn mistyped_team_reads_unknown() {
        let mut ev = live_event();
        ev["competitions"][0]["competitors"][0]["team"] = json!("Duke");
        ev["competitions"][0]["competitors"][1]["team"]["displayName"] = json!(42);
        let g = live_snapshot(&ev);
        assert_eq!(g.home_team, "Unknown");
        assert_eq!(g.away_team, "Unknown");
        assert_eq!(g.home_score, 72);
        assert_eq!(g.away_score, 68);
    }

    #[test]
    fn mistyped_clock_and_stray_competitor_are_tolerated() {
        let mut ev = live_event();
        ev["competitions"][0]["status"]["clockDisplayValue"] = json!(525);
        ev["competitions"][0]["competitors"]
            .as_array_mut()
            .unwrap()
            .push(json!("not-a-competitor"));
        let g = live_snapshot(&ev);
        assert!(g.clock.is_none());
        assert_eq!(g.home_team, "Kansas Jayhawks");
    }

    #[test]
    fn missing_id_uses_array_position() {
        let mut ev = live_event();
        ev.as_object_mut().unwrap().remove("id");
        let first = match classify_event(3, &ev) {
            EventDisposition::Live(g) => g,
            other => panic!("expected Live, got {other:?}"),
        };
        let second = match classify_event(4, &ev) {
            EventDisposition::Live(g) => g,
            other => panic!("expected Live, got {other:?}"),
        };
        assert_eq!(first.id, "event-3");
        assert_eq!(second.id, "event-4");
    }

    #[test]
    fn scores_parse_leniently() {
        assert_eq!(parse_score(Some(&json!("72"))), 72);
        assert_eq!(parse_score(Some(&json!(" 9"))), 9);
        assert_eq!(parse_score(Some(&json!("12pts"))), 12);
        assert_eq!(parse_score(Some(&json!("abc"))), 0);
        assert_eq!(parse_score(Some(&json!(""))), 0);
        assert_eq!(parse_score(Some(&json!("-4"))), 0);
        assert_eq!(parse_score(Some(&json!(55))), 55);
        assert_eq!(parse_score(Some(&json!(null))), 0);
        assert_eq!(parse_score(None), 0);
    }
}
