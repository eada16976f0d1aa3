use engine::{resolve, AttackBatch, Dice, EngineError, LookupPolicy};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::json;

/// Request accepted by `resolveJson`: the batch fields plus dice/table options.
/// `attacks` is signed; negative counts are rejected in `batch()`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolveRequest {
    attacks: i64,
    armor_class: i32,
    to_hit: i32,
    #[serde(default)]
    damage_per_hit: Option<f64>,
    #[serde(default)]
    advantage: bool,
    #[serde(default)]
    disadvantage: bool,
    #[serde(default)]
    approximate: bool,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    strict: bool,
}

impl ResolveRequest {
    fn batch(&self) -> Result<AttackBatch, EngineError> {
        let attacks = u32::try_from(self.attacks).map_err(|_| {
            EngineError::InvalidArgument(format!(
                "attacks must be between 0 and {}, got {}",
                u32::MAX,
                self.attacks
            ))
        })?;
        Ok(AttackBatch {
            attacks,
            armor_class: self.armor_class,
            to_hit: self.to_hit,
            damage_per_hit: self.damage_per_hit,
            advantage: self.advantage,
            disadvantage: self.disadvantage,
            approximate: self.approximate,
        })
    }
}

fn ok_payload(value: serde_json::Value) -> String {
    json!({ "ok": true, "result": value }).to_string()
}

fn err_payload(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

/// JSON in, JSON out; never fails, errors are reported in the payload.
pub fn resolve_json_internal(input: &str) -> String {
    let req: ResolveRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return err_payload(format!("invalid_config: {}", e)),
    };
    let policy = if req.strict {
        LookupPolicy::Strict
    } else {
        LookupPolicy::Clamp
    };
    let batch = match req.batch() {
        Ok(b) => b,
        Err(e) => return err_payload(e),
    };
    let mut dice = Dice::from_seed(req.seed);
    match resolve(&mut dice, &batch, policy) {
        Ok(res) => match serde_json::to_value(res) {
            Ok(v) => ok_payload(v),
            Err(e) => err_payload(e),
        },
        Err(e) => err_payload(e),
    }
}

fn to_jstring(env: &JNIEnv, s: String) -> jstring {
    match env.new_string(s) {
        Ok(js) => js.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_mobcalc_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    to_jstring(&env, format!("mobcalc-ffi {}", env!("CARGO_PKG_VERSION")))
}

#[no_mangle]
pub extern "system" fn Java_com_mobcalc_Ffi_resolveJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let input: String = match env.get_string(&json) {
        Ok(s) => s.into(),
        Err(e) => return to_jstring(&env, err_payload(e)),
    };
    let out = resolve_json_internal(&input);
    to_jstring(&env, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn table_mode_round_trip() {
        let out = parse(&resolve_json_internal(
            r#"{"attacks":10,"armor_class":15,"to_hit":5,"damage_per_hit":7.0,"approximate":true}"#,
        ));
        assert_eq!(out["ok"], true);
        assert_eq!(out["result"]["hits"]["hits"], 5);
        assert_eq!(out["result"]["total_damage"], 35.0);
    }

    #[test]
    fn seeded_simulation_is_repeatable() {
        let req = r#"{"attacks":25,"armor_class":14,"to_hit":4,"seed":77}"#;
        assert_eq!(resolve_json_internal(req), resolve_json_internal(req));
        let out = parse(&resolve_json_internal(req));
        assert_eq!(out["result"]["mode"], "exact");
    }

    #[test]
    fn errors_are_reported_in_payload() {
        let bad_json = parse(&resolve_json_internal("{"));
        assert_eq!(bad_json["ok"], false);
        assert!(bad_json["error"].as_str().unwrap().starts_with("invalid_config"));

        let negative = parse(&resolve_json_internal(
            r#"{"attacks":-3,"armor_class":15,"to_hit":5}"#,
        ));
        assert_eq!(negative["ok"], false);
        assert!(negative["error"].as_str().unwrap().starts_with("invalid argument"));

        let strict = parse(&resolve_json_internal(
            r#"{"attacks":3,"armor_class":40,"to_hit":5,"approximate":true,"strict":true}"#,
        ));
        assert_eq!(strict["ok"], false);
        assert!(strict["error"].as_str().unwrap().contains("outside"));

        let typo = parse(&resolve_json_internal(
            r#"{"attacks":3,"armor_class":12,"to_hit":5,"advantge":true}"#,
        ));
        assert_eq!(typo["ok"], false);
    }
}
