use crate::clef::Clef;
use serde::{Deserialize, Serialize};
use tma_ports::types::TrackIndex;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub name: String,
    pub clefs: Vec<Clef>,
    pub muted: bool,
    pub solo: bool,
}

/// Per-track playback flags and clefs of the loaded score, plus the part the
/// performer is singing. Reset on every score load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSelection {
    tracks: Vec<TrackState>,
    current: TrackIndex,
}

impl TrackSelection {
    /// `clefs[i]` lists the clef names of track `i`'s staves, as the renderer
    /// reports them.
    pub fn load(part_names: Vec<String>, clefs: Vec<Vec<String>>) -> Self {
        let count = part_names.len().max(clefs.len());
        let mut names = part_names.into_iter();
        let mut clefs = clefs.into_iter();
        let tracks = (0..count)
            .map(|idx| TrackState {
                name: names.next().unwrap_or_else(|| TrackIndex(idx).to_string()),
                clefs: clefs
                    .next()
                    .unwrap_or_default()
                    .iter()
                    .map(|name| Clef::from_name(name))
                    .collect(),
                muted: false,
                solo: false,
            })
            .collect();
        Self {
            tracks,
            current: TrackIndex(0),
        }
    }

    pub fn tracks(&self) -> &[TrackState] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current(&self) -> TrackIndex {
        self.current
    }

    pub fn current_track(&self) -> Option<&TrackState> {
        self.tracks.get(self.current.0)
    }

    /// Returns false when the index is out of range or already selected.
    pub fn select(&mut self, track: TrackIndex) -> bool {
        if track.0 >= self.tracks.len() || track == self.current {
            return false;
        }
        self.current = track;
        true
    }

    pub fn find_part(&self, name: &str) -> Option<TrackIndex> {
        self.tracks
            .iter()
            .position(|t| t.name == name)
            .map(TrackIndex)
    }

    pub fn set_muted(&mut self, track: TrackIndex, muted: bool) -> bool {
        match self.tracks.get_mut(track.0) {
            Some(state) => {
                state.muted = muted;
                true
            }
            None => false,
        }
    }

    pub fn set_solo(&mut self, track: TrackIndex, solo: bool) -> bool {
        match self.tracks.get_mut(track.0) {
            Some(state) => {
                state.solo = solo;
                true
            }
            None => false,
        }
    }

    /// Tracks that should be heard: soloed tracks if any are soloed, otherwise
    /// every unmuted track.
    pub fn audible(&self) -> Vec<TrackIndex> {
        let any_solo = self.tracks.iter().any(|t| t.solo);
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| if any_solo { t.solo } else { !t.muted })
            .map(|(idx, _)| TrackIndex(idx))
            .collect()
    }

    /// Clef of the selected part's first staff; treble when unknown.
    pub fn clef(&self) -> Clef {
        self.current_track()
            .and_then(|t| t.clefs.first().copied())
            .unwrap_or_default()
    }

    pub fn base_octave(&self) -> i32 {
        self.clef().base_octave()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn satb() -> TrackSelection {
        TrackSelection::load(
            vec!["Soprano".into(), "Alto".into(), "Tenor".into(), "Bass".into()],
            vec![
                vec!["Treble".into()],
                vec!["treble".into()],
                vec!["F4".into()],
                vec!["bass".into()],
            ],
        )
    }

    #[test]
    fn base_octave_follows_selected_part() {
        let mut selection = satb();
        assert_eq!(selection.base_octave(), 4);
        assert!(selection.select(TrackIndex(2)));
        assert_eq!(selection.base_octave(), 2);
        assert!(!selection.select(TrackIndex(2)));
        assert!(!selection.select(TrackIndex(9)));
        assert_eq!(selection.find_part("Bass"), Some(TrackIndex(3)));
    }

    #[test]
    fn missing_clefs_fall_back_to_treble() {
        let selection = TrackSelection::load(vec!["Piano".into()], Vec::new());
        assert_eq!(selection.clef(), Clef::Treble);
        assert_eq!(TrackSelection::default().base_octave(), 4);
    }

    #[test]
    fn solo_beats_mute() {
        let mut selection = satb();
        selection.set_muted(TrackIndex(0), true);
        assert_eq!(
            selection.audible(),
            vec![TrackIndex(1), TrackIndex(2), TrackIndex(3)]
        );
        selection.set_solo(TrackIndex(0), true);
        assert_eq!(selection.audible(), vec![TrackIndex(0)]);
        assert!(!selection.set_muted(TrackIndex(7), true));
    }
}
