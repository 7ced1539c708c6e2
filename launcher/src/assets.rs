//! Built-in asset library.
//!
//! Asset files are never opened; each known path is registered with the
//! collision geometry of its root and, for robots, its joints.

use nalgebra::Vector3;
use sim::spawn::Geometry;
use sim::{AssetDescriptor, AssetLibrary, SceneSetupError};

pub const DEFAULT_ASSET_ROOT: &str = "/assets";

pub const TABLE_ASSET: &str = "Props/Mounts/SeattleLabTable/table_instanceable.usd";
pub const JETBOT_ASSET: &str = "Robots/NVIDIA/Jetbot/jetbot.usd";
pub const DOFBOT_ASSET: &str = "Robots/Yahboom/Dofbot/dofbot.usd";

/// Library rooted at `root` with the table, the wheeled robot and the arm.
pub fn builtin_library(root: &str) -> Result<AssetLibrary, SceneSetupError> {
    let mut library = AssetLibrary::new(root);

    // Table top only; the prim origin sits on the top surface.
    library.register(
        TABLE_ASSET,
        AssetDescriptor::prop(
            Geometry::Cuboid {
                size: Vector3::new(1.2, 0.8, 0.05),
            },
            20.0,
        ),
    )?;

    library.register(
        JETBOT_ASSET,
        AssetDescriptor::robot(
            Geometry::Cuboid {
                size: Vector3::new(0.2, 0.15, 0.1),
            },
            0.7,
            &[("left_wheel_joint", 0.0), ("right_wheel_joint", 0.0)],
        ),
    )?;

    library.register(
        DOFBOT_ASSET,
        AssetDescriptor::robot(
            Geometry::Cylinder {
                radius: 0.06,
                height: 0.08,
            },
            1.5,
            &[
                ("joint1", 0.0),
                ("joint2", 0.0),
                ("joint3", 0.0),
                ("joint4", 0.0),
                ("Wrist_Twist_RevoluteJoint", 0.0),
                ("Finger_Left_01_RevoluteJoint", 0.0),
                ("Finger_Right_01_RevoluteJoint", 0.0),
            ],
        ),
    )?;

    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_assets_resolve_with_or_without_root() {
        let library = builtin_library(DEFAULT_ASSET_ROOT).unwrap();
        assert_eq!(library.len(), 3);
        assert!(library.resolve(TABLE_ASSET).is_ok());
        assert!(library.resolve(&library.path_of(JETBOT_ASSET)).is_ok());
        assert!(!library.resolve(TABLE_ASSET).unwrap().is_articulated());
        assert_eq!(library.resolve(DOFBOT_ASSET).unwrap().joint_names.len(), 7);
    }
}
