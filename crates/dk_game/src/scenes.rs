//! Scene switching between the editor and gameplay.
//!
//! Only the active scene receives input. The level store travels with the
//! active scene: the editor owns it while editing, the game scene holds it
//! until it hands it back to a freshly opened editor.

use dk_core::input::InputState;
use dk_level::{LevelData, LevelStore};

use crate::config::GameConfig;
use crate::editor::{EditorController, PlayRequest};
use crate::gameplay::{GameSession, SceneRequest};

pub enum ActiveScene {
    Editor(EditorController),
    Game {
        session: GameSession,
        store: Box<dyn LevelStore>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Play(PlayRequest),
    Restart(LevelData),
    Editor,
}

impl From<SceneRequest> for Transition {
    fn from(request: SceneRequest) -> Self {
        match request {
            SceneRequest::Restart(level) => Transition::Restart(level),
            SceneRequest::Editor => Transition::Editor,
        }
    }
}

impl ActiveScene {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveScene::Editor(_) => "editor",
            ActiveScene::Game { .. } => "game",
        }
    }

    fn fixed_update(&mut self, keyboard: Option<&InputState>, dt_us: u64) -> Option<Transition> {
        match self {
            ActiveScene::Editor(editor) => keyboard
                .and_then(|input| editor.handle_shortcuts(input))
                .map(Transition::Play),
            ActiveScene::Game { session, .. } => session.tick(keyboard, dt_us).map(Into::into),
        }
    }

    fn into_next(self, transition: Transition, config: &GameConfig) -> ActiveScene {
        match (self, transition) {
            (ActiveScene::Editor(editor), Transition::Play(request)) => ActiveScene::Game {
                session: GameSession::new(request.level, request.from_editor, config),
                store: editor.into_store(),
            },
            (ActiveScene::Game { session, store }, Transition::Restart(level)) => {
                ActiveScene::Game {
                    session: GameSession::new(level, session.from_editor(), config),
                    store,
                }
            }
            (ActiveScene::Game { store, .. }, Transition::Editor) => {
                ActiveScene::Editor(EditorController::open(store, &config.grid))
            }
            (scene, transition) => {
                log::warn!(
                    "Ignoring {} transition in {} scene",
                    transition_name(&transition),
                    scene.name()
                );
                scene
            }
        }
    }
}

fn transition_name(transition: &Transition) -> &'static str {
    match transition {
        Transition::Play(_) => "play",
        Transition::Restart(_) => "restart",
        Transition::Editor => "editor",
    }
}

pub struct SceneDirector {
    active: Option<ActiveScene>,
    config: GameConfig,
}

impl SceneDirector {
    /// Starts in the editor.
    pub fn new(store: Box<dyn LevelStore>, config: GameConfig) -> Self {
        let editor = EditorController::open(store, &config.grid);
        log::info!("Scene: editor");
        Self {
            active: Some(ActiveScene::Editor(editor)),
            config,
        }
    }

    pub fn active(&self) -> Option<&ActiveScene> {
        self.active.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn fixed_update(&mut self, keyboard: Option<&InputState>, dt_us: u64) {
        let transition = self
            .active
            .as_mut()
            .and_then(|scene| scene.fixed_update(keyboard, dt_us));
        if let Some(transition) = transition {
            self.apply(transition);
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let request = match self.active.as_mut() {
            Some(ActiveScene::Editor(editor)) => editor.pointer_down(x, y),
            _ => None,
        };
        if let Some(request) = request {
            self.apply(Transition::Play(request));
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(ActiveScene::Editor(editor)) = self.active.as_mut() {
            editor.pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(ActiveScene::Editor(editor)) = self.active.as_mut() {
            editor.pointer_up();
        }
    }

    pub fn pointer_left(&mut self) {
        if let Some(ActiveScene::Editor(editor)) = self.active.as_mut() {
            editor.pointer_left();
        }
    }

    fn apply(&mut self, transition: Transition) {
        let Some(scene) = self.active.take() else {
            return;
        };
        let next = scene.into_next(transition, &self.config);
        log::info!("Scene: {}", next.name());
        self.active = Some(next);
    }
}
