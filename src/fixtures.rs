//! Proof fixtures shaped like snarkjs `fullprove` output.
//!
//! Coordinates are arbitrary field-sized values; only their placement matters
//! to the code under test.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};

use crate::calldata::VerificationArgs;
use crate::circuit::CircuitArtifacts;
use crate::error::BoundaryError;
use crate::field::FieldElement;
use crate::prover::{ProverOutput, ProvingBackend};
use crate::verifier::VerificationEndpoint;

pub const GROTH16_A_X: &str =
    "6215087815076330926179520016461010917137519558660815034878824735059242618923";
pub const GROTH16_B_00: &str =
    "1435512539167240917174679779456826558986830378504343210022207924205747402421";
pub const GROTH16_B_01: &str =
    "12133246360712595014301713218460443558891071268964820037424113512722450864844";

pub const PLONK_A_X: &str =
    "14370217764983883853150210406407459395380230323068843817638056401039584197417";
pub const PLONK_EVAL_A: &str =
    "3182207118372970883536334003195692180133191924049217516925971039370408327464";
pub const PLONK_WXIW_Y: &str =
    "20596314730059406659987440535684394884271206990484574371281856647666595007211";
pub const PLONK_WXI_X: &str =
    "14946863173369069178061200639506834299635608793608238165291235055256426969982";
pub const PLONK_EVAL_ZW: &str =
    "17434791410219652014633525176879774803292836556725521273825635778361252093980";

/// HelloWorld circuit (`a * b`), witness `{a: 1, b: 2}`.
pub fn groth16_proof() -> Value {
    json!({
        "pi_a": [
            GROTH16_A_X,
            "15951728188012883138265176510482648277956245750475693862477712774865526280408",
            "1"
        ],
        "pi_b": [
            [GROTH16_B_00, GROTH16_B_01],
            [
                "19742629340793347424684343855616647637539655466559710042175432972752183486116",
                "2820422487248635544204436103609732825826976861705092992890896977555324409227"
            ],
            ["1", "0"]
        ],
        "pi_c": [
            "18255373109897049727130802781095089727510501583111313296332426910213270751782",
            "9942941882774231512755382629142620981223457028423556949891709007769605315579",
            "1"
        ],
        "protocol": "groth16",
        "curve": "bn128"
    })
}

pub fn groth16_signals() -> Value {
    json!(["2"])
}

/// Multiplier3 circuit (`a * b * c`), witness `{a: 1, b: 2, c: 3}`.
pub fn plonk_proof() -> Value {
    json!({
        "A": [
            PLONK_A_X,
            "14819443104185345886978595045022977331728925700401053624292392929989700152608",
            "1"
        ],
        "B": [
            "12207333431846253068969282408394727921219624352518340469038289857831385045224",
            "14377752999669056614861439640235639551204217020750698334065068786157193482327",
            "1"
        ],
        "C": [
            "7814208139684135926578805309384891853171022240894494358986510666314382836507",
            "8962521175585825474501259180415720809303887373768313954498266770946249359913",
            "1"
        ],
        "Z": [
            "20744957412032498022247225827319772808241968419759160885769136826113097088129",
            "10289983003262294933613480312655387507977285076429812216010509475787604965967",
            "1"
        ],
        "T1": [
            "8320585975277634520323659795384762714376595645910408363334681292685875427302",
            "14372887195084039048077272775855026716251366579886487461869234730451263582415",
            "1"
        ],
        "T2": [
            "3963741078563029651444766974988771816920565851718753091199762913798771505639",
            "2402242812371250412954159761445711518654061619054665775616153165309956091200",
            "1"
        ],
        "T3": [
            "15475351034683408689463684168724652508117160330398470418033014920461836930143",
            "13218932653908252608970957506333868586210475114595091070547427149800665464598",
            "1"
        ],
        "eval_a": PLONK_EVAL_A,
        "eval_b": "16189810822096822415384304092217629195891056776662411872582450132727240313743",
        "eval_c": "11592022232428454414994938706939340795156551393564297767746928628307026178467",
        "eval_s1": "15534049840947248374268002732252685902854558406888291373035640802093229261205",
        "eval_s2": "6019818980213619513803550501060334683989822920027787534093612308192145543580",
        "eval_zw": PLONK_EVAL_ZW,
        "Wxi": [
            PLONK_WXI_X,
            "19976091784741665260134874749374975314833252437303735177779813797869004626419",
            "1"
        ],
        "Wxiw": [
            "18611177835197000953524786999616229906500558905303665251491789901429054724363",
            PLONK_WXIW_Y,
            "1"
        ],
        "protocol": "plonk",
        "curve": "bn128"
    })
}

pub fn plonk_signals() -> Value {
    json!(["6"])
}

/// The calldata blob for [`plonk_proof`], laid out by hand in the order the
/// on-chain PLONK verifier reads it: nine G1 points (x, y), then the six
/// evaluations.
pub fn plonk_blob() -> String {
    let proof = plonk_proof();
    let pointers = [
        "/A/0", "/A/1", "/B/0", "/B/1", "/C/0", "/C/1", "/Z/0", "/Z/1", "/T1/0", "/T1/1",
        "/T2/0", "/T2/1", "/T3/0", "/T3/1", "/Wxi/0", "/Wxi/1", "/Wxiw/0", "/Wxiw/1",
        "/eval_a", "/eval_b", "/eval_c", "/eval_s1", "/eval_s2", "/eval_zw",
    ];
    let mut blob = String::from("0x");
    for pointer in pointers {
        let word = fe_at(&proof, pointer).to_hex_word().unwrap();
        blob.push_str(&word[2..]);
    }
    blob
}

fn fe_at(value: &Value, pointer: &str) -> FieldElement {
    FieldElement::parse_raw(value.pointer(pointer).and_then(Value::as_str).unwrap()).unwrap()
}

/// Accepts exactly one argument tuple, the honest one for a fixture proof.
///
/// Mimics a real endpoint closely enough for pipeline tests: any shifted,
/// swapped or altered element yields `false`.
pub struct ExpectedArgsEndpoint {
    expected: VerificationArgs,
    calls: AtomicUsize,
}

impl ExpectedArgsEndpoint {
    pub fn groth16() -> Self {
        let p = groth16_proof();
        Self::new(VerificationArgs::Groth16 {
            a: [fe_at(&p, "/pi_a/0"), fe_at(&p, "/pi_a/1")],
            b: [
                [fe_at(&p, "/pi_b/0/1"), fe_at(&p, "/pi_b/0/0")],
                [fe_at(&p, "/pi_b/1/1"), fe_at(&p, "/pi_b/1/0")],
            ],
            c: [fe_at(&p, "/pi_c/0"), fe_at(&p, "/pi_c/1")],
            input: vec![FieldElement::from(2)],
        })
    }

    pub fn plonk() -> Self {
        Self::new(VerificationArgs::Plonk {
            proof: plonk_blob(),
            input: vec![FieldElement::from(6)],
        })
    }

    fn new(expected: VerificationArgs) -> Self {
        Self {
            expected,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VerificationEndpoint for ExpectedArgsEndpoint {
    fn verify(&self, args: &VerificationArgs) -> Result<bool, BoundaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*args == self.expected)
    }
}

pub struct UnreachableEndpoint;

impl VerificationEndpoint for UnreachableEndpoint {
    fn verify(&self, _args: &VerificationArgs) -> Result<bool, BoundaryError> {
        Err(BoundaryError::Unreachable {
            program: "verifier".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Returns a canned proof regardless of witness.
pub struct FixedProver {
    output: Option<ProverOutput>,
}

impl FixedProver {
    pub fn groth16() -> Self {
        Self {
            output: Some(ProverOutput {
                proof: groth16_proof(),
                public_signals: groth16_signals(),
            }),
        }
    }

    pub fn plonk() -> Self {
        Self {
            output: Some(ProverOutput {
                proof: plonk_proof(),
                public_signals: plonk_signals(),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { output: None }
    }
}

impl ProvingBackend for FixedProver {
    fn prove(&self, _circuit: &CircuitArtifacts, _witness: &Value) -> Result<ProverOutput, BoundaryError> {
        self.output.clone().ok_or_else(|| BoundaryError::Failed {
            program: "snarkjs".to_string(),
            status: "exit status: 1".to_string(),
            output: "Error: Not enough values for input signal b".to_string(),
        })
    }
}
