use serde::{Deserialize, Serialize};

/// Number of bits reserved for tutorial messages in the original's save
/// format. Only 25 ids are actually used.
pub const NUM_TUTORIAL_MESSAGES: usize = 30;

/// One-time hint messages shown the first time the player encounters the
/// corresponding item or mechanic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TutorialMessageId {
    FoundRapidFire = 0,
    FoundHealthMolecule,
    FoundRegularWeapon,
    FoundLaser,
    FoundFlameThrower,
    FoundRocketLauncher,
    EarthQuake,
    FoundBlueKey,
    FoundAccessCard,
    FoundSpaceShip,
    FoundLetterN,
    FoundLetterU,
    FoundLetterK,
    FoundLetterE,
    KeyNeeded,
    AccessCardNeeded,
    CloakNeeded,
    RadarsStillFunctional,
    HintGlobeNeeded,
    FoundTurboLift,
    FoundTeleporter,
    LettersCollectedRightOrder,
    FoundSoda,
    FoundForceField,
    FoundDoor,
}

/// Message text for a tutorial id. A `*` marks a line break, where the
/// in-game message display pauses before continuing.
pub fn message_text(id: TutorialMessageId) -> &'static str {
    use TutorialMessageId::*;

    match id {
        FoundRapidFire => "HOLD DOWN YOUR FIRE BUTTON FOR*RAPID FIRE.",
        FoundHealthMolecule => "THIS ITEM WILL GIVE YOU ONE UNIT*OF HEALTH.",
        FoundRegularWeapon => "THIS IS YOUR REGULAR WEAPON!",
        FoundLaser => "THIS WEAPON CAN SHOOT*THROUGH ANYTHING!",
        FoundFlameThrower => {
            "THERE ARE MANY SECRETS WITH*THIS WEAPON. USE IT TO*YOUR ADVANTAGE!"
        }
        FoundRocketLauncher => {
            "A ROCKET LAUNCHER IS VERY*DEADLY. IT IS THE STRONGEST OF*ANY WEAPON!"
        }
        EarthQuake => "E A R T H Q U A K E ! ! !*WAIT, THIS IS NOT EARTH.",
        FoundBlueKey => "FIND THE DOOR THAT*THIS KEY OPENS.",
        FoundAccessCard => "USE THE CARD TO TURN OFF*FORCE FIELDS.",
        FoundSpaceShip => {
            "THE SHIP. USE THIS TO GET OUT OF THIS*LEVEL.  YOU CAN FLY ANYWHERE,\
             AND*YOUR WEAPON IS VERY POWERFUL."
        }
        FoundLetterN => "GOT THE N.  WHAT IS NEXT?",
        FoundLetterU => "GOT THE U.",
        FoundLetterK => "GOT THE K.",
        FoundLetterE => "GOT THE E.",
        KeyNeeded => "YOU NEED A KEY TO OPEN*THE DOOR.",
        AccessCardNeeded => "ACCESS DENIED.",
        CloakNeeded => {
            "OUCH, YOU NEED TO FIND THE CLOAKING*DEVICE TO DISABLE THIS FORCEFIELD."
        }
        RadarsStillFunctional => {
            "WAIT!!!!!!!!      *YOU NEED TO DESTROY ALL THE RADAR*\
             DISHES FIRST BEFORE YOU CAN COMPLETE*THE LEVEL..."
        }
        HintGlobeNeeded => {
            "THIS DEVICE WILL GIVE SPECIFIC HINTS.*FIND THE SPECIAL BLUE GLOBE AND*\
             BRING IT BACK HERE."
        }
        FoundTurboLift => "PRESS UP OR DOWN TO USE THE*TURBO LIFT.",
        FoundTeleporter => "PRESS UP OR ENTER TO USE*THE TRANSPORTER.*",
        LettersCollectedRightOrder => "EXCELLENT!  ONE HUNDRED THOUSAND*POINTS!!!!!!!!!!!",
        FoundSoda => "THE CAFFEINE IN SODAS PROVIDES*ONE UNIT OF HEALTH.",
        FoundForceField => "USE THE ACCESS CARD TO DISABLE*THIS FORCE FIELD.",
        FoundDoor => "USE A KEY TO OPEN THIS DOOR.",
    }
}

/// Which tutorial messages have already been shown, as a bit mask. Persists
/// through saved games so hints are only ever shown once per playthrough.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TutorialMessageState {
    messages_shown_mask: u32,
}

impl TutorialMessageState {
    pub fn mark_as_shown(&mut self, id: TutorialMessageId) {
        self.messages_shown_mask |= 1 << id as u32;
    }

    pub fn has_been_shown(&self, id: TutorialMessageId) -> bool {
        self.messages_shown_mask & (1 << id as u32) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_start_unshown() {
        let state = TutorialMessageState::default();
        assert!(!state.has_been_shown(TutorialMessageId::FoundRapidFire));
        assert!(!state.has_been_shown(TutorialMessageId::FoundDoor));
    }

    #[test]
    fn marking_a_message_only_affects_that_message() {
        let mut state = TutorialMessageState::default();
        state.mark_as_shown(TutorialMessageId::FoundLaser);

        assert!(state.has_been_shown(TutorialMessageId::FoundLaser));
        assert!(!state.has_been_shown(TutorialMessageId::FoundRegularWeapon));
        assert!(!state.has_been_shown(TutorialMessageId::FoundFlameThrower));
    }

    #[test]
    fn marking_is_idempotent() {
        let mut state = TutorialMessageState::default();
        state.mark_as_shown(TutorialMessageId::FoundSoda);
        let after_first = state;
        state.mark_as_shown(TutorialMessageId::FoundSoda);
        assert_eq!(state, after_first);
    }
}
