use crate::{
    constants::{GAS_LARGE_WRITE, GAS_READ, GAS_REGISTER, GAS_UPDATE},
    types::ValueTag,
};

use super::{
    ContractKind,
    Entity::{self, *},
    FunctionSpec,
    Operation::{self, *},
};

const S: ValueTag = ValueTag::String;
const U: ValueTag = ValueTag::Uint256;
const I: ValueTag = ValueTag::Int256;
const B: ValueTag = ValueTag::Bool;
const UA: ValueTag = ValueTag::Uint256Array;

const NONE: &[ValueTag] = &[];
const ID: &[ValueTag] = &[U];
const ID_CIN: &[ValueTag] = &[U, U];
const TEXT: &[ValueTag] = &[S];
const IDS: &[ValueTag] = &[UA];
const OWNER_NAME: &[ValueTag] = &[S, S];

// previousIndex, newIndex, months, vat, amount, description, address, beginningDate, endDate
const UTILITY_BILL: &[ValueTag] = &[U, U, U, U, U, S, S, U, U];
const UTILITY_BILL_UPDATE: &[ValueTag] = &[U, U, U, U, U, U, S, S, U, U];
const UTILITY_BILL_STORED: &[ValueTag] = &[U, U, U, U, U, U, S, S, U, U, B];

// cin, amount, description, beginningDate, endDate
const INTERNET_BILL: &[ValueTag] = &[U, U, S, U, U];
const INTERNET_BILL_UPDATE: &[ValueTag] = &[U, U, U, S, U, U];
const INTERNET_BILL_STORED: &[ValueTag] = &[U, U, U, S, U, U, B];

// patientName, description, amount, receptionDate
const HOSPITAL_BILL: &[ValueTag] = &[S, S, U, U];
const HOSPITAL_BILL_UPDATE: &[ValueTag] = &[U, S, S, U, U];
const HOSPITAL_BILL_STORED: &[ValueTag] = &[U, S, S, U, U, B];

// idClaim, personName, description, amount, receptionDate
const CLAIM_PAPER: &[ValueTag] = &[U, S, S, U, U];
const CLAIM_PAPER_STORED: &[ValueTag] = &[U, S, S, U, U, B];

// cin, amount, beginningDate, endDate
const PERIOD_AMOUNT: &[ValueTag] = &[U, U, U, U];
const PERIOD_AMOUNT_UPDATE: &[ValueTag] = &[U, U, U, U, U];
const SCHOLARSHIP_STORED: &[ValueTag] = &[U, U, U, U, U, B];

// fullName, phone, productIds
const DELIVERY_FEE: &[ValueTag] = &[S, U, UA];
const DELIVERY_FEE_UPDATE: &[ValueTag] = &[U, S, U, UA];
// name, quantity, price, location
const PRODUCT: &[ValueTag] = &[S, U, U, S];
const PRODUCT_UPDATE: &[ValueTag] = &[U, S, U, U, S];
// stars, comment
const RATING: &[ValueTag] = &[U, S];
const RATING_UPDATE: &[ValueTag] = &[U, U, S];

// accountId, fullname, cin, password
const PERSON: &[ValueTag] = &[S, S, I, S];
const CIN: &[ValueTag] = &[I];
const CIN_TEXT: &[ValueTag] = &[I, S];
const PERSON_MODIFY: &[ValueTag] = &[I, S, S];
const FLAG: &[ValueTag] = &[B];

const fn get_owner(name: &'static str) -> FunctionSpec {
    FunctionSpec::query(Institution, GetOwner, name, NONE, TEXT, GAS_READ)
}

const fn get_name(name: &'static str) -> FunctionSpec {
    FunctionSpec::query(Institution, GetName, name, NONE, TEXT, GAS_READ)
}

const fn update_details(name: &'static str) -> FunctionSpec {
    FunctionSpec::execute(Institution, UpdateDetails, name, OWNER_NAME, GAS_UPDATE)
}

const fn delete_institution(name: &'static str) -> FunctionSpec {
    FunctionSpec::execute(Institution, DeleteInstitution, name, NONE, GAS_READ)
}

const fn by_id(entity: Entity, operation: Operation, name: &'static str) -> FunctionSpec {
    FunctionSpec::execute(entity, operation, name, ID, GAS_READ)
}

const UTILITY_BILL_FUNCTIONS: [FunctionSpec; 6] = [
    FunctionSpec::execute(UtilityBill, Add, "addBill", UTILITY_BILL, GAS_LARGE_WRITE),
    FunctionSpec::query(UtilityBill, Get, "getBill", ID, UTILITY_BILL_STORED, GAS_READ),
    FunctionSpec::execute(UtilityBill, Update, "updateBill", UTILITY_BILL_UPDATE, GAS_UPDATE),
    by_id(UtilityBill, Pay, "payBill"),
    by_id(UtilityBill, Delete, "deleteBill"),
    FunctionSpec::query(UtilityBill, GetAll, "getAllBills", NONE, IDS, GAS_READ),
];

const SCHOLARSHIP_FUNCTIONS: [FunctionSpec; 6] = [
    FunctionSpec::execute(Scholarship, Add, "addScholarship", PERIOD_AMOUNT, GAS_UPDATE),
    FunctionSpec::query(
        Scholarship,
        Get,
        "getScholarshipDetails",
        ID_CIN,
        SCHOLARSHIP_STORED,
        GAS_READ,
    ),
    FunctionSpec::execute(Scholarship, Pay, "payScholarship", ID_CIN, GAS_READ),
    FunctionSpec::execute(
        Scholarship,
        Update,
        "updateScholarshipDetails",
        PERIOD_AMOUNT_UPDATE,
        GAS_UPDATE,
    ),
    FunctionSpec::execute(Scholarship, Delete, "deleteScholarship", ID_CIN, GAS_READ),
    FunctionSpec::query(Scholarship, GetAllByCin, "getAllScholarshipsByCIN", ID, IDS, GAS_READ),
];

static STEG: [FunctionSpec; 10] = [
    get_owner("getSTEGOwner"),
    get_name("getSTEGName"),
    update_details("updateSTEGDetails"),
    delete_institution("deleteSTEG"),
    UTILITY_BILL_FUNCTIONS[0],
    UTILITY_BILL_FUNCTIONS[1],
    UTILITY_BILL_FUNCTIONS[2],
    UTILITY_BILL_FUNCTIONS[3],
    UTILITY_BILL_FUNCTIONS[4],
    UTILITY_BILL_FUNCTIONS[5],
];

static SONEDE: [FunctionSpec; 10] = [
    get_owner("getSONEDEOwner"),
    get_name("getSONEDEName"),
    update_details("updateSONEDEDetails"),
    delete_institution("deleteSONEDE"),
    UTILITY_BILL_FUNCTIONS[0],
    UTILITY_BILL_FUNCTIONS[1],
    UTILITY_BILL_FUNCTIONS[2],
    UTILITY_BILL_FUNCTIONS[3],
    UTILITY_BILL_FUNCTIONS[4],
    UTILITY_BILL_FUNCTIONS[5],
];

static INTERNET: [FunctionSpec; 9] = [
    get_owner("getInternetOwner"),
    get_name("getOperatorName"),
    update_details("updateInternetDetails"),
    delete_institution("deleteInternet"),
    FunctionSpec::execute(InternetBill, Add, "addBill", INTERNET_BILL, GAS_REGISTER),
    FunctionSpec::query(InternetBill, Get, "getBill", ID, INTERNET_BILL_STORED, GAS_READ),
    FunctionSpec::execute(InternetBill, Update, "updateBill", INTERNET_BILL_UPDATE, GAS_UPDATE),
    by_id(InternetBill, Pay, "payBill"),
    by_id(InternetBill, Delete, "deleteBill"),
];

static HOPITAL: [FunctionSpec; 9] = [
    get_owner("getHopitalOwner"),
    get_name("getHopitalName"),
    update_details("updateHopitalDetails"),
    delete_institution("deleteHopital"),
    FunctionSpec::execute(HospitalBill, Add, "addBill", HOSPITAL_BILL, GAS_LARGE_WRITE),
    FunctionSpec::query(HospitalBill, Get, "getBill", ID, HOSPITAL_BILL_STORED, GAS_READ),
    FunctionSpec::execute(HospitalBill, Update, "updateBill", HOSPITAL_BILL_UPDATE, GAS_REGISTER),
    by_id(HospitalBill, Pay, "payBill"),
    by_id(HospitalBill, Delete, "deleteBill"),
];

static CNAM: [FunctionSpec; 9] = [
    get_owner("getCnamOwner"),
    get_name("getCnamName"),
    update_details("updateCnamDetails"),
    delete_institution("deleteCnam"),
    FunctionSpec::execute(ClaimPaper, Add, "addPaper", CLAIM_PAPER, GAS_LARGE_WRITE),
    FunctionSpec::query(ClaimPaper, Get, "getPaper", ID, CLAIM_PAPER_STORED, GAS_READ),
    FunctionSpec::execute(ClaimPaper, Update, "updatePaper", CLAIM_PAPER, GAS_UPDATE),
    by_id(ClaimPaper, Pay, "payPaper"),
    by_id(ClaimPaper, Delete, "deletePaper"),
];

static UNIVERSITY: [FunctionSpec; 13] = [
    get_owner("getUniversityOwner"),
    get_name("getUniversityName"),
    update_details("updateUniversityDetails"),
    delete_institution("deleteUniversity"),
    FunctionSpec::execute(TuitionFee, Add, "addFees", PERIOD_AMOUNT, GAS_UPDATE),
    FunctionSpec::execute(TuitionFee, Pay, "payFees", ID_CIN, GAS_READ),
    FunctionSpec::query(TuitionFee, GetAllByCin, "getAllFeesByCIN", ID, IDS, GAS_READ),
    SCHOLARSHIP_FUNCTIONS[0],
    SCHOLARSHIP_FUNCTIONS[1],
    SCHOLARSHIP_FUNCTIONS[2],
    SCHOLARSHIP_FUNCTIONS[3],
    SCHOLARSHIP_FUNCTIONS[4],
    SCHOLARSHIP_FUNCTIONS[5],
];

static OOU: [FunctionSpec; 10] = [
    get_owner("getOOUOwner"),
    get_name("getOOURegion"),
    update_details("updateOOURegion"),
    delete_institution("deleteOOU"),
    SCHOLARSHIP_FUNCTIONS[0],
    SCHOLARSHIP_FUNCTIONS[1],
    SCHOLARSHIP_FUNCTIONS[2],
    SCHOLARSHIP_FUNCTIONS[3],
    SCHOLARSHIP_FUNCTIONS[4],
    SCHOLARSHIP_FUNCTIONS[5],
];

static DELIVERY: [FunctionSpec; 17] = [
    get_owner("getCompanyOwner"),
    get_name("getCompanyName"),
    update_details("updateCompanyDetails"),
    delete_institution("deleteCompany"),
    FunctionSpec::execute(DeliveryFee, Add, "addFees", DELIVERY_FEE, GAS_LARGE_WRITE),
    FunctionSpec::query(DeliveryFee, Get, "getFees", ID, DELIVERY_FEE, GAS_READ),
    FunctionSpec::execute(DeliveryFee, Update, "updateFees", DELIVERY_FEE_UPDATE, GAS_UPDATE),
    by_id(DeliveryFee, Pay, "payFees"),
    by_id(DeliveryFee, Delete, "deleteFees"),
    FunctionSpec::execute(Product, Add, "addProduct", PRODUCT, GAS_UPDATE),
    FunctionSpec::query(Product, Get, "getProduct", ID, PRODUCT, GAS_READ),
    FunctionSpec::execute(Product, Update, "updateProduct", PRODUCT_UPDATE, GAS_UPDATE),
    by_id(Product, Delete, "deleteProduct"),
    FunctionSpec::execute(Rating, Add, "addRating", RATING, GAS_UPDATE),
    FunctionSpec::query(Rating, Get, "getRating", ID, RATING, GAS_READ),
    FunctionSpec::execute(Rating, Update, "updateRating", RATING_UPDATE, GAS_UPDATE),
    by_id(Rating, Delete, "deleteRating"),
];

static PERSON_REGISTRY: [FunctionSpec; 7] = [
    FunctionSpec::execute(Person, Register, "register", PERSON, GAS_REGISTER),
    FunctionSpec::execute(Person, Modify, "modifyPerson", PERSON_MODIFY, GAS_UPDATE),
    FunctionSpec::execute(Person, UpdatePassword, "updatePassword", CIN_TEXT, GAS_UPDATE),
    FunctionSpec::execute(Person, Login, "login", CIN_TEXT, GAS_UPDATE),
    FunctionSpec::query(Person, GetAccountId, "getAccountId", CIN, TEXT, GAS_READ),
    FunctionSpec::query(Person, GetFullname, "getFullname", CIN, TEXT, GAS_READ),
    FunctionSpec::query(Person, CanLogin, "canLogin", CIN, FLAG, GAS_READ),
];

pub(super) fn functions(kind: ContractKind) -> &'static [FunctionSpec] {
    match kind {
        ContractKind::Steg => &STEG,
        ContractKind::Sonede => &SONEDE,
        ContractKind::Internet => &INTERNET,
        ContractKind::Hopital => &HOPITAL,
        ContractKind::Cnam => &CNAM,
        ContractKind::University => &UNIVERSITY,
        ContractKind::Oou => &OOU,
        ContractKind::Delivery => &DELIVERY,
        ContractKind::PersonRegistry => &PERSON_REGISTRY,
    }
}
