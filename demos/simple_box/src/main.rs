// Arrow keys move a blue box around a white window until it is closed.

use anyhow::Result;
use boxloop::{BoxScene, Engine, SceneConfig};

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting simple_box");

    Engine::new()
        .with_title("Simple Pygame")
        .with_size(800, 600)
        .with_vsync(true)
        .run(BoxScene::new(SceneConfig::default()))
}
