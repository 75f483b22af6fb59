use crate::error::RoomError;
use crate::hand::{self, HandRank};
use crate::types::{
    Card, Deck, GamePhase, PlayerAction, Seat, SeatStatus, BIG_BLIND, INITIAL_CHIPS, MAX_PLAYERS,
    MIN_PLAYERS, SMALL_BLIND,
};

/// What happened as a direct result of applying one action.
///
/// `Continue` covers both "still the same betting round" and "round closed,
/// phase advanced, betting continues" — the caller (room actor) broadcasts a
/// snapshot either way. The other two variants carry everything needed for
/// the caller to emit the richer `gameEnded` broadcast.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Continue,
    /// Every remaining player went all-in; the remaining streets were dealt
    /// in one batch. Each entry is the community cards added by one street,
    /// in order, so the caller can broadcast an intermediate snapshot after
    /// every street before the final showdown broadcast.
    AllInRunout {
        streets: Vec<Vec<Card>>,
        showdown: ShowdownResult,
    },
    HandEnded(ShowdownResult),
}

#[derive(Debug, Clone)]
pub struct WinnerInfo {
    pub id: String,
    pub name: String,
    pub chips: u32,
}

#[derive(Debug, Clone)]
pub struct ShowdownResult {
    pub winners: Vec<WinnerInfo>,
    pub is_tie: bool,
    pub pot: u32,
    pub winning_hand: String,
    /// (id, name, hole cards) of every player who did not fold.
    pub all_hands: Vec<(String, String, (Card, Card))>,
    pub community_cards: Vec<Card>,
    /// Seated players demoted to spectating because they were heartbeat-timed-out
    /// at the moment this hand ended.
    pub demoted_to_spectating: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub players: Vec<Seat>,
    pub spectators: Vec<Seat>,
    pub waiting: Vec<Seat>,
    pub community_cards: Vec<Card>,
    pub pot: u32,
    pub current_bet: u32,
    pub dealer_index: usize,
    pub current_turn: usize,
    pub game_phase: GamePhase,
    pub last_raise_seat: i32,
    pub round_start_seat: usize,
    deck: Deck,
    buy_ins: std::collections::HashMap<String, u32>,
}

impl Room {
    pub fn new(id: String) -> Self {
        Room {
            id,
            players: Vec::new(),
            spectators: Vec::new(),
            waiting: Vec::new(),
            community_cards: Vec::new(),
            pot: 0,
            current_bet: 0,
            dealer_index: 0,
            current_turn: 0,
            game_phase: GamePhase::Waiting,
            last_raise_seat: -1,
            round_start_seat: 0,
            deck: Deck::new(),
            buy_ins: std::collections::HashMap::new(),
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.players.iter().any(|s| s.name == name)
            || self.spectators.iter().any(|s| s.name == name)
            || self.waiting.iter().any(|s| s.name == name)
    }

    pub fn find_seat(&self, id: &str) -> Option<&Seat> {
        self.players
            .iter()
            .chain(self.spectators.iter())
            .chain(self.waiting.iter())
            .find(|s| s.id == id)
    }

    /// A new connection joins as a spectator.
    pub fn join(&mut self, id: String, name: String, chips: u32) -> Result<(), RoomError> {
        if self.name_taken(&name) {
            return Err(RoomError::NameTaken);
        }
        self.spectators
            .push(Seat::new_spectator(id, name, chips));
        Ok(())
    }

    /// A spectator asks to take a seat at the table.
    pub fn sit_down(&mut self, id: &str) -> Result<(), RoomError> {
        let pos = self
            .spectators
            .iter()
            .position(|s| s.id == id)
            .ok_or(RoomError::NotSeated)?;

        if self.game_phase == GamePhase::Waiting {
            if self.players.len() >= MAX_PLAYERS {
                return Err(RoomError::RoomFull);
            }
            let mut seat = self.spectators.remove(pos);
            seat.status = SeatStatus::Playing;
            self.players.push(seat);
        } else {
            if self.players.len() + self.waiting.len() >= MAX_PLAYERS {
                return Err(RoomError::RoomFull);
            }
            let seat = self.spectators.remove(pos);
            self.waiting.push(seat);
        }
        Ok(())
    }

    /// Adds chips to a participant found in any of the three rosters and
    /// returns their new total.
    pub fn buy_hand(&mut self, id: &str, amount: u32) -> Result<u32, RoomError> {
        let seat = self
            .players
            .iter_mut()
            .chain(self.waiting.iter_mut())
            .chain(self.spectators.iter_mut())
            .find(|s| s.id == id)
            .ok_or(RoomError::NotSeated)?;
        seat.chips += amount;
        *self.buy_ins.entry(seat.name.clone()).or_insert(0) += 1;
        Ok(seat.chips)
    }

    pub fn buy_hand_count(&self, name: &str) -> u32 {
        self.buy_ins.get(name).copied().unwrap_or(0)
    }

    /// Removes a connection from whichever roster it occupies.
    pub fn leave(&mut self, id: &str) {
        self.players.retain(|s| s.id != id);
        self.spectators.retain(|s| s.id != id);
        self.waiting.retain(|s| s.id != id);
    }

    pub fn set_heartbeat_timeout(&mut self, id: &str, timed_out: bool) {
        for seat in self
            .players
            .iter_mut()
            .chain(self.spectators.iter_mut())
            .chain(self.waiting.iter_mut())
        {
            if seat.id == id {
                seat.heartbeat_timeout = timed_out;
                return;
            }
        }
    }

    pub fn current_turn_seat_id(&self) -> Option<&str> {
        if self.game_phase.is_betting_phase() {
            self.players.get(self.current_turn).map(|s| s.id.as_str())
        } else {
            None
        }
    }

    /// Starts a new hand. Returns `Ok(false)` (silently ignored, per the
    /// protocol's tolerance for racing `startGame` calls) unless there are
    /// enough seated players and no hand is already running.
    pub fn start_hand(&mut self) -> Result<bool, RoomError> {
        if self.game_phase != GamePhase::Waiting || self.players.len() < MIN_PLAYERS {
            return Ok(false);
        }

        for seat in &mut self.players {
            seat.reset_for_new_hand();
        }

        let n = self.players.len();
        self.dealer_index %= n;
        let small_blind_index = (self.dealer_index + 1) % n;
        let big_blind_index = (self.dealer_index + 2) % n;

        self.deck = Deck::shuffled();
        // Two full rounds, one card at a time, starting at (dealer+1) — not
        // two cards to the same player before moving on — so a pinned seed
        // reproduces the historical deal order.
        let mut first_cards = Vec::with_capacity(n);
        for _ in 0..n {
            first_cards.push(self.deck.draw().ok_or(RoomError::DeckExhausted)?);
        }
        let mut second_cards = Vec::with_capacity(n);
        for _ in 0..n {
            second_cards.push(self.deck.draw().ok_or(RoomError::DeckExhausted)?);
        }
        for i in 0..n {
            let idx = (small_blind_index + i) % n;
            self.players[idx].hole = Some((first_cards[i], second_cards[i]));
        }

        self.players[self.dealer_index].is_dealer = true;
        self.players[small_blind_index].is_small = true;
        self.players[big_blind_index].is_big = true;

        self.post_blind(small_blind_index, SMALL_BLIND);
        self.post_blind(big_blind_index, BIG_BLIND);

        self.pot = self.players.iter().map(|p| p.bet).sum();
        self.current_bet = BIG_BLIND;
        self.last_raise_seat = big_blind_index as i32;
        self.current_turn = (big_blind_index + 1) % n;
        self.round_start_seat = small_blind_index;
        self.community_cards.clear();
        self.game_phase = GamePhase::Preflop;
        for seat in &mut self.players {
            seat.acted = false;
        }

        Ok(true)
    }

    fn post_blind(&mut self, idx: usize, amount: u32) {
        let seat = &mut self.players[idx];
        let posted = amount.min(seat.chips);
        seat.chips -= posted;
        seat.bet = posted;
        if seat.chips == 0 {
            seat.all_in = true;
        }
    }

    pub fn apply_action(
        &mut self,
        actor_id: &str,
        action: PlayerAction,
    ) -> Result<ActionOutcome, RoomError> {
        let idx = self
            .players
            .iter()
            .position(|s| s.id == actor_id)
            .ok_or(RoomError::NotSeated)?;
        if idx != self.current_turn {
            return Err(RoomError::NotYourTurn);
        }
        self.apply_action_inner(idx, action)
    }

    /// Re-validates a turn-timer fire and, if still applicable, synthesizes
    /// `check` or `fold` for the expected seat. Returns `None` when the
    /// firing is stale (phase/seat no longer match) — a cheap no-op.
    pub fn apply_timer_fallback(
        &mut self,
        expected_seat: usize,
        expected_phase: GamePhase,
    ) -> Option<ActionOutcome> {
        if self.game_phase != expected_phase || !self.game_phase.is_betting_phase() {
            return None;
        }
        if self.current_turn != expected_seat {
            return None;
        }
        let seat = self.players.get(expected_seat)?;
        if !seat.can_act() {
            return None;
        }
        let action = self.auto_action_for(expected_seat);
        Some(
            self.apply_action_inner(expected_seat, action)
                .expect("timer fallback targets the current actor by construction"),
        )
    }

    fn auto_action_for(&self, idx: usize) -> PlayerAction {
        if self.players[idx].bet == self.current_bet {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        }
    }

    fn apply_action_inner(
        &mut self,
        idx: usize,
        action: PlayerAction,
    ) -> Result<ActionOutcome, RoomError> {
        match action {
            PlayerAction::Fold => {
                self.players[idx].folded = true;
                self.players[idx].acted = true;
            }
            PlayerAction::Check => {
                if self.players[idx].bet != self.current_bet {
                    return Err(RoomError::CannotCheck);
                }
                self.players[idx].acted = true;
            }
            PlayerAction::Call => {
                let owed = self.current_bet.saturating_sub(self.players[idx].bet);
                let transfer = owed.min(self.players[idx].chips);
                self.players[idx].chips -= transfer;
                self.players[idx].bet += transfer;
                self.pot += transfer;
                if self.players[idx].chips == 0 {
                    self.players[idx].all_in = true;
                }
                self.players[idx].acted = true;
            }
            PlayerAction::Raise(amount) => {
                if amount < BIG_BLIND {
                    return Err(RoomError::RaiseTooSmall);
                }
                let pot_sized = amount == self.pot;
                let new_total = if pot_sized {
                    self.players[idx].bet + amount
                } else {
                    self.current_bet + amount
                };
                let transfer = new_total.saturating_sub(self.players[idx].bet);
                if transfer == 0 {
                    return Err(RoomError::InvalidRaise);
                }
                let actual_transfer = transfer.min(self.players[idx].chips);
                if actual_transfer == 0 {
                    return Err(RoomError::InsufficientChips);
                }
                self.players[idx].chips -= actual_transfer;
                self.players[idx].bet += actual_transfer;
                self.pot += actual_transfer;
                if self.players[idx].chips == 0 {
                    self.players[idx].all_in = true;
                }
                if self.players[idx].bet > self.current_bet {
                    self.current_bet = self.players[idx].bet;
                    self.last_raise_seat = idx as i32;
                    for (i, seat) in self.players.iter_mut().enumerate() {
                        seat.acted = i == idx;
                    }
                } else {
                    self.players[idx].acted = true;
                }
            }
        }

        Ok(self.advance_turn())
    }

    fn non_folded_indices(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.folded)
            .map(|(i, _)| i)
            .collect()
    }

    fn actionable_indices(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, s)| s.can_act())
            .map(|(i, _)| i)
            .collect()
    }

    fn next_actable_seat(&self) -> Option<usize> {
        let n = self.players.len();
        for step in 1..=n {
            let idx = (self.current_turn + step) % n;
            if self.players[idx].can_act() {
                return Some(idx);
            }
        }
        None
    }

    fn next_actable_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        for step in 0..n {
            let idx = (start + step) % n;
            if self.players[idx].can_act() {
                return Some(idx);
            }
        }
        None
    }

    fn round_closed(&self) -> bool {
        let actionable = self.actionable_indices();
        if actionable.is_empty() {
            return true;
        }
        let all_matched = actionable
            .iter()
            .all(|&i| self.players[i].bet == self.current_bet);
        let all_acted = actionable.iter().all(|&i| self.players[i].acted);
        all_matched && all_acted
    }

    fn advance_turn(&mut self) -> ActionOutcome {
        let non_folded = self.non_folded_indices();
        if non_folded.len() == 1 {
            let showdown = self.run_showdown();
            return ActionOutcome::HandEnded(showdown);
        }

        let all_all_in = non_folded.iter().all(|&i| self.players[i].all_in);
        if all_all_in {
            let streets = self.deal_remaining_streets();
            let showdown = self.run_showdown();
            return ActionOutcome::AllInRunout { streets, showdown };
        }

        if self.round_closed() {
            return self.advance_phase();
        }

        match self.next_actable_seat() {
            Some(idx) => {
                self.current_turn = idx;
                if self.players[idx].heartbeat_timeout {
                    let action = self.auto_action_for(idx);
                    self.apply_action_inner(idx, action)
                        .expect("auto-action targets the current actor by construction")
                } else {
                    ActionOutcome::Continue
                }
            }
            None => {
                let streets = self.deal_remaining_streets();
                let showdown = self.run_showdown();
                ActionOutcome::AllInRunout { streets, showdown }
            }
        }
    }

    fn reset_bets_for_new_round(&mut self) {
        for seat in &mut self.players {
            seat.reset_for_new_round();
            seat.acted = false;
        }
        self.current_bet = 0;
        self.last_raise_seat = -1;
    }

    fn deal_remaining_streets(&mut self) -> Vec<Vec<Card>> {
        let mut streets = Vec::new();
        loop {
            match self.game_phase {
                GamePhase::Preflop => {
                    streets.push(self.deal_community(3));
                    self.game_phase = GamePhase::Flop;
                }
                GamePhase::Flop => {
                    streets.push(self.deal_community(1));
                    self.game_phase = GamePhase::Turn;
                }
                GamePhase::Turn => {
                    streets.push(self.deal_community(1));
                    self.game_phase = GamePhase::River;
                }
                GamePhase::River | GamePhase::Showdown | GamePhase::Waiting => break,
            }
        }
        streets
    }

    fn deal_community(&mut self, n: usize) -> Vec<Card> {
        let mut cards = Vec::with_capacity(n);
        for _ in 0..n {
            if let Some(c) = self.deck.draw() {
                cards.push(c);
            }
        }
        self.community_cards.extend(cards.iter().copied());
        cards
    }

    fn advance_phase(&mut self) -> ActionOutcome {
        let next = match self.game_phase {
            GamePhase::Preflop => GamePhase::Flop,
            GamePhase::Flop => GamePhase::Turn,
            GamePhase::Turn => GamePhase::River,
            GamePhase::River => GamePhase::Showdown,
            other => other,
        };

        if next == GamePhase::Showdown {
            self.game_phase = GamePhase::Showdown;
            let showdown = self.run_showdown();
            return ActionOutcome::HandEnded(showdown);
        }

        let dealt = match next {
            GamePhase::Flop => 3,
            GamePhase::Turn | GamePhase::River => 1,
            _ => 0,
        };
        self.deal_community(dealt);
        self.game_phase = next;
        self.reset_bets_for_new_round();

        let n = self.players.len();
        let small_blind_index = (self.dealer_index + 1) % n;
        match self.next_actable_from(small_blind_index) {
            Some(idx) => {
                self.current_turn = idx;
                self.round_start_seat = idx;
                ActionOutcome::Continue
            }
            None => {
                let streets = self.deal_remaining_streets();
                let showdown = self.run_showdown();
                ActionOutcome::AllInRunout { streets, showdown }
            }
        }
    }

    fn run_showdown(&mut self) -> ShowdownResult {
        let non_folded = self.non_folded_indices();
        let pot = self.pot;

        let all_hands: Vec<(String, String, (Card, Card))> = non_folded
            .iter()
            .filter_map(|&i| {
                self.players[i]
                    .hole
                    .map(|hole| (self.players[i].id.clone(), self.players[i].name.clone(), hole))
            })
            .collect();

        let (winners, is_tie, winning_hand) = if non_folded.len() == 1 {
            let i = non_folded[0];
            (vec![i], false, String::new())
        } else {
            let ranks: Vec<(usize, HandRank)> = non_folded
                .iter()
                .map(|&i| {
                    let mut cards = self.community_cards.clone();
                    if let Some((a, b)) = self.players[i].hole {
                        cards.push(a);
                        cards.push(b);
                    }
                    (i, hand::evaluate(&cards))
                })
                .collect();
            let best = ranks.iter().map(|(_, r)| r).max().cloned().unwrap();
            let winners: Vec<usize> = ranks
                .iter()
                .filter(|(_, r)| *r == best)
                .map(|(i, _)| *i)
                .collect();
            let is_tie = winners.len() > 1;
            (winners, is_tie, best.description())
        };

        let share = pot / winners.len() as u32;
        let remainder = pot % winners.len() as u32;
        let mut winner_infos = Vec::with_capacity(winners.len());
        for (n, &i) in winners.iter().enumerate() {
            let amount = share + if n == 0 { remainder } else { 0 };
            self.players[i].chips += amount;
            winner_infos.push(WinnerInfo {
                id: self.players[i].id.clone(),
                name: self.players[i].name.clone(),
                chips: self.players[i].chips,
            });
        }

        let demoted_to_spectating = self.finish_hand();

        ShowdownResult {
            winners: winner_infos,
            is_tie,
            pot,
            winning_hand,
            all_hands,
            community_cards: self.community_cards.clone(),
            demoted_to_spectating,
        }
    }

    fn finish_hand(&mut self) -> Vec<(String, String)> {
        self.pot = 0;
        self.current_bet = 0;
        self.last_raise_seat = -1;
        self.game_phase = GamePhase::Waiting;

        for seat in &mut self.players {
            seat.reset_for_new_hand();
        }

        self.dealer_index = (self.dealer_index + 1) % self.players.len().max(1);

        let mut spill_to_spectate = Vec::new();
        self.players.retain(|s| {
            if s.heartbeat_timeout {
                spill_to_spectate.push(s.clone());
                false
            } else {
                true
            }
        });
        let demoted: Vec<(String, String)> = spill_to_spectate
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        for mut s in spill_to_spectate {
            s.heartbeat_timeout = false;
            s.status = SeatStatus::Spectating;
            self.spectators.push(s);
        }

        while self.players.len() < MAX_PLAYERS && !self.waiting.is_empty() {
            let mut seat = self.waiting.remove(0);
            if seat.chips == 0 {
                seat.chips = INITIAL_CHIPS;
            }
            seat.status = SeatStatus::Playing;
            self.players.push(seat);
        }

        if !self.players.is_empty() {
            self.dealer_index %= self.players.len();
        } else {
            self.dealer_index = 0;
        }

        demoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated_room(n: usize) -> Room {
        let mut room = Room::new("000001".to_string());
        for i in 0..n {
            room.join(format!("c{i}"), format!("p{i}"), INITIAL_CHIPS).unwrap();
            room.sit_down(&format!("c{i}")).unwrap();
        }
        room
    }

    #[test]
    fn start_hand_needs_minimum_players() {
        let mut room = seated_room(2);
        assert!(!room.start_hand().unwrap());
        assert_eq!(room.game_phase, GamePhase::Waiting);
    }

    #[test]
    fn start_hand_posts_blinds_and_deals() {
        let mut room = seated_room(4);
        assert!(room.start_hand().unwrap());
        assert_eq!(room.game_phase, GamePhase::Preflop);
        assert_eq!(room.pot, SMALL_BLIND + BIG_BLIND);
        for seat in &room.players {
            assert!(seat.hole.is_some());
        }
    }

    #[test]
    fn fold_to_one_awards_whole_pot() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        loop {
            let idx = room.current_turn;
            let id = room.players[idx].id.clone();
            match room.apply_action(&id, PlayerAction::Fold) {
                Ok(ActionOutcome::HandEnded(showdown)) => {
                    assert_eq!(showdown.winners.len(), 1);
                    assert_eq!(showdown.winning_hand, "");
                    break;
                }
                Ok(_) => continue,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }

    #[test]
    fn not_your_turn_is_rejected() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let wrong = (room.current_turn + 1) % room.players.len();
        let id = room.players[wrong].id.clone();
        assert!(matches!(
            room.apply_action(&id, PlayerAction::Check),
            Err(RoomError::NotYourTurn)
        ));
    }

    #[test]
    fn raise_equal_to_pot_is_pot_sized() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let pot_before = room.pot;
        let actor = room.players[room.current_turn].id.clone();
        room.apply_action(&actor, PlayerAction::Raise(pot_before)).unwrap();
        // Pot-sized: new total bet = the actor's bet before the raise (0) + amount.
        assert_eq!(room.current_bet, pot_before);
    }

    #[test]
    fn raise_of_pot_plus_one_is_relative_to_current_bet_not_pot_sized() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let pot_before = room.pot;
        let current_bet_before = room.current_bet;
        let actor = room.players[room.current_turn].id.clone();
        room.apply_action(&actor, PlayerAction::Raise(pot_before + 1)).unwrap();
        assert_eq!(room.current_bet, current_bet_before + pot_before + 1);
    }

    #[test]
    fn raise_below_big_blind_is_rejected() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let actor = room.players[room.current_turn].id.clone();
        assert!(matches!(
            room.apply_action(&actor, PlayerAction::Raise(BIG_BLIND - 1)),
            Err(RoomError::RaiseTooSmall)
        ));
    }

    #[test]
    fn all_players_all_in_preflop_deals_straight_to_river_in_one_batch() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let chips_before: u32 = room.players.iter().map(|p| p.chips + p.bet).sum();

        // Every seat shoves for its entire stack in turn; nobody folds, so
        // once the last call lands everyone is all-in simultaneously.
        loop {
            let idx = room.current_turn;
            let id = room.players[idx].id.clone();
            let stack = room.players[idx].chips;
            let outcome = if stack > 0 {
                room.apply_action(&id, PlayerAction::Raise(stack)).unwrap()
            } else {
                room.apply_action(&id, PlayerAction::Call).unwrap()
            };
            if let ActionOutcome::AllInRunout { streets, showdown } = outcome {
                assert_eq!(streets.iter().map(Vec::len).sum::<usize>(), 5);
                assert_eq!(showdown.community_cards.len(), 5);
                let chips_after: u32 = room.players.iter().map(|p| p.chips).sum();
                assert_eq!(chips_before, chips_after);
                return;
            }
        }
    }

    #[test]
    fn tied_winners_split_the_pot_with_remainder_to_first_seat() {
        let mut room = seated_room(3);
        room.game_phase = GamePhase::River;
        room.pot = 101;
        room.community_cards = vec![
            Card::new(crate::types::Suit::Spades, crate::types::Rank(5)),
            Card::new(crate::types::Suit::Spades, crate::types::Rank(6)),
            Card::new(crate::types::Suit::Spades, crate::types::Rank(7)),
            Card::new(crate::types::Suit::Spades, crate::types::Rank(8)),
            Card::new(crate::types::Suit::Spades, crate::types::Rank(9)),
        ];
        // The board's straight flush plays for both remaining seats; their
        // hole cards are irrelevant kickers that can't beat the board itself.
        room.players[0].hole = Some((
            Card::new(crate::types::Suit::Hearts, crate::types::Rank(2)),
            Card::new(crate::types::Suit::Hearts, crate::types::Rank(3)),
        ));
        room.players[1].hole = Some((
            Card::new(crate::types::Suit::Diamonds, crate::types::Rank(2)),
            Card::new(crate::types::Suit::Diamonds, crate::types::Rank(3)),
        ));
        room.players[2].folded = true;

        let showdown = room.run_showdown();
        assert!(showdown.is_tie);
        assert_eq!(showdown.winners.len(), 2);
        assert_eq!(showdown.winners[0].chips, INITIAL_CHIPS + 51);
        assert_eq!(showdown.winners[1].chips, INITIAL_CHIPS + 50);
    }

    #[test]
    fn turn_timer_fallback_is_idempotent_and_ignores_stale_firings() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let seat = room.current_turn;
        let phase = room.game_phase;

        // A firing for any other seat is stale and a no-op.
        assert!(room.apply_timer_fallback((seat + 1) % 4, phase).is_none());

        // The real firing auto-resolves the actor's turn.
        assert!(room.apply_timer_fallback(seat, phase).is_some());

        // Firing again for the seat/phase it was scheduled against is now
        // stale too, since the turn has already moved on.
        assert!(room.apply_timer_fallback(seat, phase).is_none());
    }

    #[test]
    fn heartbeat_timed_out_seat_auto_acts_when_its_turn_comes() {
        let mut room = seated_room(4);
        room.start_hand().unwrap();
        let utg = room.current_turn;
        let dealer = room.dealer_index;
        room.players[dealer].heartbeat_timeout = true;

        let utg_id = room.players[utg].id.clone();
        room.apply_action(&utg_id, PlayerAction::Call).unwrap();

        // The dealer is next to act after UTG calls; being heartbeat-timed-out,
        // they auto-fold (their bet doesn't match current_bet) and the turn
        // moves on to the small blind without waiting for a real action.
        assert!(room.players[dealer].folded);
        let small_blind = (dealer + 1) % room.players.len();
        assert_eq!(room.current_turn, small_blind);
    }
}
