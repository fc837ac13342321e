//! Fixed option lists used by the intake schemas

use crate::field::Choice;

/// A physician patients can pick as their primary doctor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doctor {
	pub name: &'static str,
	pub image: &'static str,
}

pub const DOCTORS: &[Doctor] = &[
	Doctor {
		name: "John Green",
		image: "/assets/images/dr-green.png",
	},
	Doctor {
		name: "Leila Cameron",
		image: "/assets/images/dr-cameron.png",
	},
	Doctor {
		name: "David Livingston",
		image: "/assets/images/dr-livingston.png",
	},
	Doctor {
		name: "Evan Peter",
		image: "/assets/images/dr-peter.png",
	},
	Doctor {
		name: "Jane Powell",
		image: "/assets/images/dr-powell.png",
	},
	Doctor {
		name: "Alex Ramirez",
		image: "/assets/images/dr-remirez.png",
	},
	Doctor {
		name: "Jasmine Lee",
		image: "/assets/images/dr-lee.png",
	},
	Doctor {
		name: "Alyana Cruz",
		image: "/assets/images/dr-cruz.png",
	},
	Doctor {
		name: "Hardik Sharma",
		image: "/assets/images/dr-sharma.png",
	},
];

pub const IDENTIFICATION_TYPES: &[&str] = &[
	"Birth Certificate",
	"Driver's License",
	"Medical Insurance Card/Policy",
	"Military ID Card",
	"National Identity Card",
	"Passport",
	"Resident Alien Card (Green Card)",
	"Social Security Card",
	"State ID Card",
	"Student ID Card",
	"Voter ID Card",
];

pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];

pub fn doctor_choices() -> Vec<Choice> {
	DOCTORS
		.iter()
		.map(|doctor| Choice::plain(doctor.name).with_image(doctor.image))
		.collect()
}

pub fn find_doctor(name: &str) -> Option<&'static Doctor> {
	DOCTORS.iter().find(|doctor| doctor.name == name)
}

pub fn identification_choices() -> Vec<Choice> {
	IDENTIFICATION_TYPES.iter().copied().map(Choice::plain).collect()
}

pub fn gender_choices() -> Vec<Choice> {
	GENDER_OPTIONS.iter().copied().map(Choice::plain).collect()
}
