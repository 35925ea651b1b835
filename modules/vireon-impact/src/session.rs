//! Placement session state.
//!
//! Actions are folded into state by a pure reducer. Every action that changes
//! the placement recomputes the impact result in full and drops any pending
//! mitigation, which would otherwise describe a placement that no longer
//! exists.

use std::sync::Arc;

use vireon_geo::GeoPoint;

use crate::building::Placement;
use crate::criteria::ImpactResult;
use crate::layers::CityLayers;
use crate::mitigation::{MitigationResult, MitigationSearch};
use crate::model::ImpactModel;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Place(Placement),
    Move(GeoPoint),
    /// Absolute rotation in degrees clockwise.
    Rotate(f64),
    SetHeight(f64),
    ProposeMitigation,
    ApplyMitigation,
    DismissMitigation,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub placement: Option<Placement>,
    pub impact: Option<ImpactResult>,
    pub mitigation: Option<MitigationResult>,
}

pub struct SessionReducer {
    model: ImpactModel,
    search: MitigationSearch,
    layers: Arc<CityLayers>,
}

impl SessionReducer {
    pub fn new(model: ImpactModel, search: MitigationSearch, layers: Arc<CityLayers>) -> Self {
        Self {
            model,
            search,
            layers,
        }
    }

    pub fn reduce(&self, state: &mut SessionState, action: &SessionAction) {
        match action {
            SessionAction::Place(placement) => self.replace(state, Some(placement.clone())),
            SessionAction::Move(center) => {
                let next = state.placement.as_ref().map(|p| p.with_center(*center));
                self.replace_if_placed(state, next);
            }
            SessionAction::Rotate(degrees) => {
                let next = state.placement.as_ref().map(|p| p.with_rotation(*degrees));
                self.replace_if_placed(state, next);
            }
            SessionAction::SetHeight(height) => {
                let next = state.placement.as_ref().map(|p| p.with_height(*height));
                self.replace_if_placed(state, next);
            }
            SessionAction::ProposeMitigation => {
                state.mitigation = match (&state.placement, &state.impact) {
                    (Some(p), Some(impact)) => {
                        self.search.propose(&self.model, p, impact, &self.layers)
                    }
                    _ => None,
                };
            }
            SessionAction::ApplyMitigation => {
                let (Some(placement), Some(mitigation)) = (&state.placement, state.mitigation.take())
                else {
                    return;
                };
                let mut next = placement.clone();
                if let Some(center) = mitigation.new_center {
                    next.center = center;
                }
                if let Some(height) = mitigation.new_height_m {
                    next.height_m = height;
                }
                self.replace(state, Some(next));
            }
            SessionAction::DismissMitigation => state.mitigation = None,
            SessionAction::Clear => *state = SessionState::default(),
        }
    }

    /// Fold a sequence of actions from the given state.
    pub fn fold<'a>(
        &self,
        mut state: SessionState,
        actions: impl IntoIterator<Item = &'a SessionAction>,
    ) -> SessionState {
        for action in actions {
            self.reduce(&mut state, action);
        }
        state
    }

    fn replace_if_placed(&self, state: &mut SessionState, next: Option<Placement>) {
        if next.is_some() {
            self.replace(state, next);
        }
    }

    fn replace(&self, state: &mut SessionState, placement: Option<Placement>) {
        state.impact = placement
            .as_ref()
            .map(|p| self.model.evaluate(p, &self.layers));
        state.placement = placement;
        state.mitigation = None;
    }
}

#[cfg(test)]
mod tests {
    use vireon_geo::Footprint;

    use super::*;
    use crate::building::BuildingTemplate;

    fn reducer() -> SessionReducer {
        SessionReducer::new(
            ImpactModel::default(),
            MitigationSearch::default(),
            Arc::new(CityLayers::default()),
        )
    }

    fn placement() -> Placement {
        Placement::new(
            Arc::new(BuildingTemplate {
                id: "hall".into(),
                name: "Hall".into(),
                kind: "civic".into(),
                description: String::new(),
                footprint: Footprint::rectangle(50.0, 30.0),
                default_height_m: 14.0,
                cost_estimate: 0.0,
            }),
            GeoPoint::new(-76.52, 44.24),
        )
    }

    #[test]
    fn actions_without_placement_are_ignored() {
        let r = reducer();
        let state = r.fold(
            SessionState::default(),
            &[
                SessionAction::Move(GeoPoint::new(0.0, 0.0)),
                SessionAction::SetHeight(20.0),
                SessionAction::ProposeMitigation,
                SessionAction::ApplyMitigation,
            ],
        );
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn moving_recomputes_impact_and_drops_mitigation() {
        let r = reducer();
        let mut state = r.fold(
            SessionState::default(),
            &[SessionAction::Place(placement()), SessionAction::ProposeMitigation],
        );
        assert!(state.mitigation.is_some());
        let before = state.impact.clone().unwrap();

        let moved = GeoPoint::new(-76.4810, 44.2312);
        r.reduce(&mut state, &SessionAction::Move(moved));

        assert!(state.mitigation.is_none());
        let after = state.impact.unwrap();
        assert_eq!(state.placement.unwrap().center, moved);
        assert_ne!(before.centroid, after.centroid);
    }

    #[test]
    fn applying_mitigation_updates_placement() {
        let r = reducer();
        let mut state = r.fold(
            SessionState::default(),
            &[SessionAction::Place(placement()), SessionAction::ProposeMitigation],
        );
        let mitigation = state.mitigation.clone().unwrap();

        r.reduce(&mut state, &SessionAction::ApplyMitigation);

        let placed = state.placement.as_ref().unwrap();
        match (mitigation.new_center, mitigation.new_height_m) {
            (Some(center), _) => assert_eq!(placed.center, center),
            (None, Some(height)) => assert_eq!(placed.height_m, height),
            (None, None) => panic!("mitigation changed nothing"),
        }
        assert_eq!(state.impact.as_ref().unwrap().overall_acceptance, mitigation.after_acceptance);
        assert!(state.mitigation.is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let r = reducer();
        let state = r.fold(
            SessionState::default(),
            &[SessionAction::Place(placement()), SessionAction::Rotate(45.0), SessionAction::Clear],
        );
        assert_eq!(state, SessionState::default());
    }
}
