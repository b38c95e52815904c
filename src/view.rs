use serde::{Deserialize, Serialize};
use crate::action::{Action, ActionKind};
use crate::Character;
use crate::error::CoupError;
use crate::player::{Player, ASSASSINATE_COST, COUP_COST};

/// What everyone at the table can see about one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: usize,
    pub name: String,
    pub coins: u8,
    pub is_alive: bool,
    pub revealed: Vec<Character>,
    // face down cards
    pub hidden: usize,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            coins: player.coins(),
            is_alive: player.is_alive(),
            revealed: player.revealed().collect(),
            hidden: player.influence_count(),
        }
    }
}

/// The game from the perspective of someone who can't see any face down card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicView {
    pub turn: usize,
    pub current_player: usize,
    pub deck_size: usize,
    pub players: Vec<PlayerView>,
}

impl PublicView {
    pub fn alive_opponents(&self, player_idx: usize) -> impl Iterator<Item=&PlayerView> + '_ {
        // seat order starting after the given player
        let n = self.players.len();
        (1..n)
            .map(move |offset| &self.players[(player_idx + offset) % n])
            .filter(|p| p.is_alive)
    }

    /// Checks a proposal by `me` against the rules of the table.
    pub fn check(&self, me: &Player, action: &Action) -> Result<(), CoupError> {
        let illegal = |reason: &'static str| Err(CoupError::IllegalAction(action.clone(), reason));

        if action.origin() != me.id {
            return illegal("proposed on behalf of another player");
        }
        if me.id != self.current_player {
            return illegal("not this player's turn");
        }
        if !me.is_alive() {
            return illegal("eliminated players can't act");
        }
        if !action.kind().is_proposable() {
            return illegal("not something a player can do on their turn");
        }
        if me.must_coup() && action.kind() != ActionKind::Coup {
            return illegal("must coup with 10 or more coins");
        }

        match (action.kind().requires_target(), action.target()) {
            (false, Some(_)) => return illegal("takes no target"),
            (true, None) => return illegal("needs a target"),
            (true, Some(target)) => {
                if target == me.id {
                    return illegal("can't target yourself");
                }
                match self.players.get(target) {
                    None => return illegal("no such player"),
                    Some(view) if !view.is_alive => return illegal("target is eliminated"),
                    Some(_) => {}
                }
            }
            (false, None) => {}
        }

        match action.kind() {
            ActionKind::Coup if me.coins() < COUP_COST => illegal("a coup costs 7 coins"),
            ActionKind::Assassin if me.coins() < ASSASSINATE_COST => illegal("an assassination costs 3 coins"),
            _ => Ok(()),
        }
    }

    /// Every proposal `me` could legally make right now.
    pub fn legal_actions(&self, me: &Player) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.players.len() * 3 + 4);

        if me.id != self.current_player || !me.is_alive() {
            return actions;
        }

        if me.must_coup() {
            // forced coup at 10+
            for opponent in self.alive_opponents(me.id) {
                actions.push(Action::new(ActionKind::Coup, me.id, Some(opponent.id)));
            }
            return actions;
        }

        actions.push(Action::new(ActionKind::Revenue, me.id, None));
        actions.push(Action::new(ActionKind::ForeignAid, me.id, None));
        actions.push(Action::new(ActionKind::Duke, me.id, None));
        actions.push(Action::new(ActionKind::Ambassador, me.id, None));

        for opponent in self.alive_opponents(me.id) {
            if me.can_coup() {
                actions.push(Action::new(ActionKind::Coup, me.id, Some(opponent.id)));
            }
            if me.coins() >= ASSASSINATE_COST {
                actions.push(Action::new(ActionKind::Assassin, me.id, Some(opponent.id)));
            }
            actions.push(Action::new(ActionKind::Captain, me.id, Some(opponent.id)));
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{Action, ActionKind};
    use crate::Card;
    use crate::Character::{Contessa, Duke};
    use crate::error::CoupError;
    use crate::player::Player;
    use crate::view::{PlayerView, PublicView};

    fn seat(id: usize, coins: u8) -> Player {
        Player::new(id, format!("Player {id}"), vec![Card::new(Duke), Card::new(Contessa)], coins)
    }

    fn view(players: &[Player], current_player: usize) -> PublicView {
        PublicView {
            turn: 0,
            current_player,
            deck_size: 15 - players.len() * 2,
            players: players.iter().map(PlayerView::from).collect(),
        }
    }

    #[test]
    fn hides_face_down_cards() {
        let mut p = seat(0, 2);
        p.lose_one_influence(1).unwrap();
        let v = PlayerView::from(&p);
        assert_eq!(v.revealed, vec![Contessa]);
        assert_eq!(v.hidden, 1);
    }

    #[test]
    fn forced_coup_at_ten() {
        let players = vec![seat(0, 10), seat(1, 2), seat(2, 2)];
        let v = view(&players, 0);
        let actions = v.legal_actions(&players[0]);
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.kind() == ActionKind::Coup));

        let revenue = Action::new(ActionKind::Revenue, 0, None);
        assert!(matches!(v.check(&players[0], &revenue), Err(CoupError::IllegalAction(_, _))));
    }

    #[test]
    fn no_coup_below_seven() {
        for coins in 0..7 {
            let players = vec![seat(0, coins), seat(1, 2), seat(2, 2)];
            let v = view(&players, 0);
            assert!(v.legal_actions(&players[0]).iter().all(|a| a.kind() != ActionKind::Coup));
            assert!(v.check(&players[0], &Action::new(ActionKind::Coup, 0, Some(1))).is_err());
        }

        let players = vec![seat(0, 7), seat(1, 2)];
        let v = view(&players, 0);
        v.check(&players[0], &Action::new(ActionKind::Coup, 0, Some(1))).unwrap();
    }

    #[test]
    fn every_legal_action_passes_the_check() {
        for coins in [0, 2, 3, 7, 9, 10, 12] {
            let players = vec![seat(0, 2), seat(1, coins), seat(2, 0), seat(3, 5)];
            let v = view(&players, 1);
            let actions = v.legal_actions(&players[1]);
            assert!(!actions.is_empty());
            for action in actions {
                v.check(&players[1], &action).unwrap();
            }
        }
    }

    #[test]
    fn targets_must_be_living_opponents() {
        let mut players = vec![seat(0, 3), seat(1, 2), seat(2, 2)];
        players[2].lose_one_influence(0).unwrap();
        players[2].lose_one_influence(1).unwrap();
        let v = view(&players, 0);

        let me = &players[0];
        assert!(v.check(me, &Action::new(ActionKind::Captain, 0, Some(0))).is_err());
        assert!(v.check(me, &Action::new(ActionKind::Captain, 0, Some(2))).is_err());
        assert!(v.check(me, &Action::new(ActionKind::Captain, 0, Some(9))).is_err());
        assert!(v.check(me, &Action::new(ActionKind::Captain, 0, None)).is_err());
        assert!(v.check(me, &Action::new(ActionKind::Duke, 0, Some(1))).is_err());
        v.check(me, &Action::new(ActionKind::Assassin, 0, Some(1))).unwrap();

        // a player with nothing to steal can still be targeted
        let players = vec![seat(0, 2), seat(1, 0)];
        let v = view(&players, 0);
        v.check(&players[0], &Action::new(ActionKind::Captain, 0, Some(1))).unwrap();

        assert!(v.legal_actions(&players[0]).iter().all(|a| a.target() != Some(0)));
        assert!(v.alive_opponents(0).all(|p| p.id == 1));
    }

    #[test]
    fn only_turn_actions_can_be_proposed() {
        let players = vec![seat(0, 2), seat(1, 2)];
        let v = view(&players, 0);
        for kind in [ActionKind::Challenge, ActionKind::DoNothing, ActionKind::CounterForeignAidWithDuke] {
            assert!(v.check(&players[0], &Action::new(kind, 0, None)).is_err());
        }

        // out of turn
        assert!(v.check(&players[1], &Action::new(ActionKind::Revenue, 1, None)).is_err());
        assert!(v.legal_actions(&players[1]).is_empty());
        // on someone else's behalf
        assert!(v.check(&players[0], &Action::new(ActionKind::Revenue, 1, None)).is_err());
    }
}
