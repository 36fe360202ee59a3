//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! 支持的缓动名：
//!
//! ```text
//! linear / none
//! ease / ease-in / ease-out / ease-in-out
//! power0..power4[.in|.out|.inOut]     （powerN 为 N+1 次方）
//! sine.* / expo.* / back.*(overshoot)
//! elastic[.out](amplitude, period)
//! bounce[.out]
//! spring
//! ```

use std::f64::consts::PI;
use std::fmt;

use crate::error::AnimationError;

const DEFAULT_BACK_OVERSHOOT: f64 = 1.70158;
const DEFAULT_ELASTIC_AMPLITUDE: f64 = 1.0;
const DEFAULT_ELASTIC_PERIOD: f64 = 0.3;

/// 缓动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EaseMode {
    /// 缓入（先慢后快）
    In,
    /// 缓出（先快后慢）
    #[default]
    Out,
    /// 缓入缓出（两头慢中间快）
    InOut,
}

impl EaseMode {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "in" => Some(EaseMode::In),
            "out" => Some(EaseMode::Out),
            "inout" | "in-out" => Some(EaseMode::InOut),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EaseMode::In => "in",
            EaseMode::Out => "out",
            EaseMode::InOut => "inOut",
        }
    }

    /// 把"缓入"曲线变换为当前方向
    fn shape(self, t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
        match self {
            EaseMode::In => ease_in(t),
            EaseMode::Out => 1.0 - ease_in(1.0 - t),
            EaseMode::InOut => {
                if t < 0.5 {
                    ease_in(2.0 * t) / 2.0
                } else {
                    1.0 - ease_in(2.0 - 2.0 * t) / 2.0
                }
            }
        }
    }
}

/// 缓动函数
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// 线性（匀速）
    Linear,
    /// 幂函数
    Power { exponent: i32, mode: EaseMode },
    /// 正弦
    Sine(EaseMode),
    /// 指数
    Expo(EaseMode),
    /// 回弹（超过终点后返回）
    Back { overshoot: f64, mode: EaseMode },
    /// 弹性缓出
    Elastic { amplitude: f64, period: f64 },
    /// 弹跳缓出
    Bounce,
}

impl Default for Easing {
    /// `power2.out`
    fn default() -> Self {
        Easing::Power {
            exponent: 3,
            mode: EaseMode::Out,
        }
    }
}

impl Easing {
    /// 弹性缓出
    pub fn elastic(amplitude: f64, period: f64) -> Self {
        Easing::Elastic {
            amplitude,
            period,
        }
    }

    /// 解析缓动名
    pub fn parse(name: &str) -> Result<Self, AnimationError> {
        let invalid = || AnimationError::InvalidEasing {
            name: name.to_string(),
        };

        let normalized = name.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(invalid());
        }

        // 拆出参数列表：`back.out(1.7)`、`elastic.out(1, 0.3)`
        let (head, args) = match normalized.split_once('(') {
            Some((head, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
                let args = inner
                    .split(',')
                    .map(|a| a.trim())
                    .filter(|a| !a.is_empty())
                    .map(|a| a.parse::<f64>().map_err(|_| invalid()))
                    .collect::<Result<Vec<_>, _>>()?;
                (head.trim(), args)
            }
            None => (normalized.as_str(), Vec::new()),
        };

        match head {
            "linear" | "none" => return Ok(Easing::Linear),
            "ease" => {
                return Ok(Easing::Power {
                    exponent: 2,
                    mode: EaseMode::InOut,
                });
            }
            "ease-in" | "ease-out" | "ease-in-out" => {
                let mode = EaseMode::parse(&head["ease-".len()..]).ok_or_else(invalid)?;
                return Ok(Easing::Power { exponent: 3, mode });
            }
            "spring" => return Ok(Easing::elastic(DEFAULT_ELASTIC_AMPLITUDE, 0.5)),
            _ => {}
        }

        let (family, mode) = match head.split_once('.') {
            Some((family, mode)) => (family, EaseMode::parse(mode).ok_or_else(invalid)?),
            None => (head, EaseMode::Out),
        };

        if let Some(level) = family.strip_prefix("power") {
            let level: i32 = level.parse().map_err(|_| invalid())?;
            if !(0..=4).contains(&level) {
                return Err(invalid());
            }
            return Ok(Easing::Power {
                exponent: level + 1,
                mode,
            });
        }

        match family {
            "quad" => Ok(Easing::Power { exponent: 2, mode }),
            "cubic" => Ok(Easing::Power { exponent: 3, mode }),
            "quart" => Ok(Easing::Power { exponent: 4, mode }),
            "sine" => Ok(Easing::Sine(mode)),
            "expo" => Ok(Easing::Expo(mode)),
            "back" => Ok(Easing::Back {
                overshoot: args.first().copied().unwrap_or(DEFAULT_BACK_OVERSHOOT),
                mode,
            }),
            "elastic" if mode == EaseMode::Out => Ok(Easing::elastic(
                args.first().copied().unwrap_or(DEFAULT_ELASTIC_AMPLITUDE),
                args.get(1).copied().unwrap_or(DEFAULT_ELASTIC_PERIOD),
            )),
            "bounce" if mode == EaseMode::Out => Ok(Easing::Bounce),
            _ => Err(invalid()),
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)，超出范围会被限制
    ///
    /// # 返回
    /// - 缓动后的进度值；`t >= 1` 时精确返回 1.0（back / elastic 中途可能越界）
    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::Power { exponent, mode } => mode.shape(t, |x| x.powi(exponent)),
            Easing::Sine(mode) => mode.shape(t, |x| 1.0 - (x * PI / 2.0).cos()),
            Easing::Expo(mode) => mode.shape(t, |x| {
                if x == 0.0 {
                    0.0
                } else {
                    2.0_f64.powf(10.0 * x - 10.0)
                }
            }),
            Easing::Back { overshoot, mode } => {
                mode.shape(t, |x| (overshoot + 1.0) * x * x * x - overshoot * x * x)
            }
            Easing::Elastic { amplitude, period } => ease_out_elastic(t, amplitude, period),
            Easing::Bounce => ease_out_bounce(t),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::Power { exponent, mode } => write!(f, "power{}.{}", exponent - 1, mode.as_str()),
            Easing::Sine(mode) => write!(f, "sine.{}", mode.as_str()),
            Easing::Expo(mode) => write!(f, "expo.{}", mode.as_str()),
            Easing::Back { overshoot, mode } => write!(f, "back.{}({})", mode.as_str(), overshoot),
            Easing::Elastic { amplitude, period } => {
                write!(f, "elastic.out({}, {})", amplitude, period)
            }
            Easing::Bounce => write!(f, "bounce.out"),
        }
    }
}

/// 弹性缓出
fn ease_out_elastic(t: f64, amplitude: f64, period: f64) -> f64 {
    let amplitude = amplitude.max(1.0);
    let period = period.max(f64::EPSILON);
    let shift = period / (2.0 * PI) * (1.0 / amplitude).asin();
    amplitude * 2.0_f64.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
}

/// 弹跳缓出
fn ease_out_bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_linear() {
        let easing = Easing::parse("linear").unwrap();
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_clamp() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_power_levels() {
        let quad_in = Easing::parse("power1.in").unwrap();
        assert!(close(quad_in.apply(0.5), 0.25));

        let cubic_out = Easing::parse("power2.out").unwrap();
        assert_eq!(cubic_out, Easing::default());
        assert!(close(cubic_out.apply(0.5), 0.875));

        let in_out = Easing::parse("power2.inOut").unwrap();
        assert!(close(in_out.apply(0.5), 0.5));

        // 省略方向时默认缓出
        assert_eq!(
            Easing::parse("power3").unwrap(),
            Easing::Power {
                exponent: 4,
                mode: EaseMode::Out
            }
        );
    }

    #[test]
    fn test_css_names() {
        assert!(Easing::parse("ease").is_ok());
        assert!(Easing::parse("ease-in-out").is_ok());
        assert_eq!(
            Easing::parse("EASE-OUT").unwrap(),
            Easing::Power {
                exponent: 3,
                mode: EaseMode::Out
            }
        );
    }

    #[test]
    fn test_back_with_argument() {
        let back = Easing::parse("back.out(1.7)").unwrap();
        assert_eq!(
            back,
            Easing::Back {
                overshoot: 1.7,
                mode: EaseMode::Out
            }
        );
        // 中途越过终点
        assert!(back.apply(0.7) > 1.0);
        assert_eq!(back.apply(1.0), 1.0);
    }

    #[test]
    fn test_elastic_and_bounce_end_points() {
        let elastic = Easing::parse("elastic.out(1.2, 0.4)").unwrap();
        assert_eq!(elastic, Easing::elastic(1.2, 0.4));
        assert_eq!(elastic.apply(0.0), 0.0);
        assert_eq!(elastic.apply(1.0), 1.0);

        let bounce = Easing::parse("bounce").unwrap();
        assert!((bounce.apply(0.999) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_expo_and_sine() {
        let expo = Easing::parse("expo.out").unwrap();
        assert!(expo.apply(0.5) > 0.9);
        let sine = Easing::parse("sine.inOut").unwrap();
        assert!(close(sine.apply(0.5), 0.5));
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "wobble", "power9.out", "power2.sideways", "back.out(abc)", "elastic.in"] {
            assert!(
                matches!(Easing::parse(name), Err(AnimationError::InvalidEasing { .. })),
                "{name} 应该无法解析"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["linear", "power1.out", "expo.inOut", "bounce.out"] {
            let easing = Easing::parse(name).unwrap();
            assert_eq!(Easing::parse(&easing.to_string()).unwrap(), easing);
        }
    }
}
