use std::f64::consts::PI;

use serde::Serialize;

/// 舌の姿勢（口腔モデル座標。z が前方）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TonguePose {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

/// 音素を発音するときの口の形。描画層がそのまま適用する。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MouthPose {
    pub tongue: TonguePose,
    /// 唇の開き（0 = 閉, 1 = 全開）
    pub lip_aperture: f64,
    /// 唇の横幅。1 未満で丸める。
    pub lip_width: f64,
    /// 上下の歯の間隔
    pub teeth_gap: f64,
}

/// 母音やその他の子音に使う中立の姿勢
pub const NEUTRAL_POSE: MouthPose = MouthPose {
    tongue: TonguePose {
        position: [0.0, -0.9, 0.5],
        rotation: [0.0, 0.0, 0.0],
        scale: [1.5, 0.5, 1.0],
    },
    lip_aperture: 1.0,
    lip_width: 1.0,
    teeth_gap: 0.5,
};

/// 舌と唇を指定し、歯の間隔は唇の開きに合わせる
const fn lips_follow(tongue: TonguePose, lip_aperture: f64) -> MouthPose {
    MouthPose {
        tongue,
        lip_aperture,
        lip_width: 1.0,
        teeth_gap: lip_aperture,
    }
}

const BACK_OF_TONGUE: MouthPose = lips_follow(
    TonguePose {
        position: [0.0, 0.2, -0.5],
        rotation: [-PI / 8.0, 0.0, 0.0],
        scale: [1.5, 0.6, 1.2],
    },
    0.6,
);

const MOUTH_POSES: &[(&str, MouthPose)] = &[
    (
        "r",
        lips_follow(
            TonguePose {
                position: [0.0, -0.4, 1.2],
                rotation: [-PI / 6.0, 0.0, 0.0],
                scale: [1.2, 0.6, 1.5],
            },
            0.7,
        ),
    ),
    (
        "th",
        MouthPose {
            tongue: TonguePose {
                position: [0.0, 0.0, 1.8],
                rotation: [0.0, 0.0, 0.0],
                scale: [1.5, 0.3, 1.2],
            },
            lip_aperture: 0.5,
            lip_width: 1.0,
            teeth_gap: 0.3,
        },
    ),
    (
        "s",
        MouthPose {
            tongue: TonguePose {
                position: [0.0, 0.1, 1.0],
                rotation: [0.0, 0.0, 0.0],
                scale: [1.5, 0.2, 2.0],
            },
            lip_aperture: 0.4,
            lip_width: 1.0,
            teeth_gap: 0.2,
        },
    ),
    (
        "sh",
        MouthPose {
            tongue: TonguePose {
                position: [0.0, 0.3, 0.5],
                rotation: [PI / 12.0, 0.0, 0.0],
                scale: [1.5, 0.4, 1.5],
            },
            lip_aperture: 0.3,
            lip_width: 0.9,
            teeth_gap: 0.3,
        },
    ),
    (
        "l",
        lips_follow(
            TonguePose {
                position: [0.0, 0.5, 1.5],
                rotation: [PI / 8.0, 0.0, 0.0],
                scale: [1.5, 0.3, 1.8],
            },
            0.6,
        ),
    ),
    ("k", BACK_OF_TONGUE),
    ("g", BACK_OF_TONGUE),
];

/// 記号（大文字小文字は区別しない）に対応する口の形。未登録なら中立。
pub fn mouth_pose(symbol: &str) -> MouthPose {
    let symbol = symbol.to_lowercase();
    MOUTH_POSES
        .iter()
        .find(|(key, _)| *key == symbol)
        .map(|(_, pose)| *pose)
        .unwrap_or(NEUTRAL_POSE)
}
