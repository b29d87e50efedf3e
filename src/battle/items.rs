use crate::battle::actions::{BattleAction, EffectSource};
use crate::battle::triggers::{ListenerContext, PassiveEffect, TriggerEvent, TriggerKind, ValueQuery};
use crate::errors::ListenerError;
use crate::rng::BattleRng;
use schema::ItemEffect;

impl PassiveEffect for ItemEffect {
    fn triggers(&self) -> &'static [TriggerKind] {
        match self {
            ItemEffect::TurnEndHeal { .. } => &[TriggerKind::TurnEnd],
            ItemEffect::BoostWithRecoil { .. } => &[TriggerKind::AfterMove],
            ItemEffect::ContactRecoil { .. } => &[TriggerKind::ContactReceived],
            ItemEffect::PinchHeal { .. } => &[TriggerKind::DamageTaken],
            ItemEffect::SpeedMultiplier(_)
            | ItemEffect::AttackMultiplier { .. }
            | ItemEffect::TypeBoost { .. }
            | ItemEffect::SuperEffectiveBoost(_) => &[],
        }
    }

    fn can_apply(&self, cx: &ListenerContext<'_>) -> bool {
        let Ok(owner) = cx.owner() else {
            return false;
        };
        match (self, cx.event) {
            (ItemEffect::TurnEndHeal { .. }, TriggerEvent::TurnEnd) => {
                cx.owner_active() && !owner.is_full_hp()
            }
            (ItemEffect::BoostWithRecoil { .. }, TriggerEvent::AfterMove { user, dealt_damage, .. }) => {
                cx.is_owner(*user) && *dealt_damage && cx.owner_active()
            }
            (ItemEffect::ContactRecoil { .. }, TriggerEvent::ContactReceived { defender, attacker }) => {
                cx.is_owner(*defender) && cx.field.is_active(*attacker)
            }
            (ItemEffect::PinchHeal { threshold_percent, .. }, TriggerEvent::DamageTaken { target, .. }) => {
                cx.is_owner(*target)
                    && cx.owner_active()
                    && owner.hp_ratio() * 100.0 <= f64::from(*threshold_percent)
            }
            _ => false,
        }
    }

    fn process(
        &self,
        cx: &ListenerContext<'_>,
        _rng: &mut BattleRng,
    ) -> Result<Vec<BattleAction>, ListenerError> {
        let owner = cx.owner()?;
        let holder = cx.listener.owner;
        let source = EffectSource::from(cx.listener.source);
        let actions = match (self, cx.event) {
            (ItemEffect::TurnEndHeal { denominator }, _) => vec![
                BattleAction::message(format!(
                    "{} restored a little HP using its {}!",
                    owner.name(),
                    cx.label
                )),
                BattleAction::Heal {
                    target: holder,
                    amount: owner.fraction_of_max_hp(*denominator),
                    source,
                },
            ],
            (ItemEffect::BoostWithRecoil { recoil_denominator, .. }, _) => vec![
                BattleAction::message(format!("{} lost some of its HP!", owner.name())),
                BattleAction::Damage {
                    target: holder,
                    amount: owner.fraction_of_max_hp(*recoil_denominator),
                    source,
                },
            ],
            (ItemEffect::ContactRecoil { denominator }, TriggerEvent::ContactReceived { attacker, .. }) => {
                vec![BattleAction::ContactDamage {
                    attacker: *attacker,
                    holder,
                    denominator: *denominator,
                    cause: source,
                }]
            }
            // The heal itself is scheduled by consumption so the berry cannot fire twice.
            (ItemEffect::PinchHeal { .. }, _) => vec![BattleAction::ConsumeItem { target: holder }],
            _ => Vec::new(),
        };
        Ok(actions)
    }

    fn modify_value(&self, query: &ValueQuery<'_>) -> f64 {
        match (self, query) {
            (ItemEffect::SpeedMultiplier(multiplier), ValueQuery::Speed { .. }) => *multiplier,
            (
                ItemEffect::AttackMultiplier {
                    category,
                    multiplier,
                },
                ValueQuery::Damage { move_data, .. },
            ) if move_data.category == *category => *multiplier,
            (ItemEffect::BoostWithRecoil { multiplier, .. }, ValueQuery::Damage { move_data, .. })
                if move_data.is_damaging() =>
            {
                *multiplier
            }
            (
                ItemEffect::TypeBoost {
                    element,
                    multiplier,
                },
                ValueQuery::Damage { move_data, .. },
            ) if move_data.element == *element && move_data.is_damaging() => *multiplier,
            (
                ItemEffect::SuperEffectiveBoost(multiplier),
                ValueQuery::Damage { effectiveness, .. },
            ) if *effectiveness > 1.0 => *multiplier,
            _ => 1.0,
        }
    }
}
