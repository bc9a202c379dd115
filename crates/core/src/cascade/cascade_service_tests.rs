#[cfg(test)]
mod tests {
    use crate::activities::{Activity, ActivityRepositoryTrait, ActivityType};
    use crate::cascade::{
        CascadeMutation, CascadeService, CascadeServiceTrait, CascadeWriteRepositoryTrait,
    };
    use crate::errors::{DatabaseError, Error, Result};
    use crate::irr::{
        FundIrrValue, IrrRepositoryTrait, PortfolioIrrValue, XirrCalculator,
    };
    use crate::portfolios::{Portfolio, PortfolioFund, PortfolioRepositoryTrait};
    use crate::valuations::{FundValuation, PortfolioValuation, ValuationRepositoryTrait};
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::{Arc, Mutex};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- In-memory store backing every repository trait ---

    #[derive(Default)]
    struct StoreState {
        portfolios: HashMap<String, Portfolio>,
        funds: HashMap<String, PortfolioFund>,
        fund_valuations: HashMap<String, FundValuation>,
        portfolio_valuations: HashMap<(String, NaiveDate), PortfolioValuation>,
        activities: Vec<Activity>,
        fund_irrs: HashMap<(String, NaiveDate), FundIrrValue>,
        portfolio_irrs: HashMap<(String, NaiveDate), PortfolioIrrValue>,
        write_log: Vec<CascadeMutation>,
        fail_commit: bool,
    }

    #[derive(Clone, Default)]
    struct MockStore {
        state: Arc<Mutex<StoreState>>,
    }

    impl MockStore {
        fn add_portfolio(&self, id: &str) {
            let mut s = self.state.lock().unwrap();
            s.portfolios.insert(
                id.to_string(),
                Portfolio {
                    id: id.to_string(),
                    name: format!("Portfolio {}", id),
                    created_at: Utc::now(),
                },
            );
        }

        fn add_fund(&self, id: &str, portfolio_id: &str, end_date: Option<NaiveDate>) {
            let mut s = self.state.lock().unwrap();
            s.funds.insert(
                id.to_string(),
                PortfolioFund {
                    id: id.to_string(),
                    portfolio_id: portfolio_id.to_string(),
                    fund_name: format!("Fund {}", id),
                    start_date: date(2020, 1, 1),
                    end_date,
                    created_at: Utc::now(),
                },
            );
        }

        fn add_fund_valuation(&self, id: &str, fund_id: &str, on: NaiveDate, amount: Decimal) {
            let mut s = self.state.lock().unwrap();
            s.fund_valuations.insert(
                id.to_string(),
                FundValuation {
                    id: id.to_string(),
                    portfolio_fund_id: fund_id.to_string(),
                    valuation_date: on,
                    amount,
                    created_at: Utc::now(),
                },
            );
        }

        fn add_activity(&self, fund_id: &str, on: NaiveDate, amount: Decimal, kind: ActivityType) {
            let mut s = self.state.lock().unwrap();
            let id = format!("act-{}", s.activities.len());
            s.activities.push(Activity {
                id,
                portfolio_fund_id: fund_id.to_string(),
                activity_date: on,
                amount,
                activity_type: kind,
                created_at: Utc::now(),
            });
        }

        fn add_fund_irr(&self, fund_id: &str, on: NaiveDate, rate: Decimal) {
            let mut s = self.state.lock().unwrap();
            s.fund_irrs.insert(
                (fund_id.to_string(), on),
                FundIrrValue::new(fund_id, on, rate),
            );
        }

        fn add_portfolio_valuation(&self, portfolio_id: &str, on: NaiveDate, amount: Decimal) {
            let mut s = self.state.lock().unwrap();
            s.portfolio_valuations.insert(
                (portfolio_id.to_string(), on),
                PortfolioValuation::new(portfolio_id, on, amount),
            );
        }

        fn add_portfolio_irr(&self, portfolio_id: &str, on: NaiveDate, rate: Decimal) {
            let mut s = self.state.lock().unwrap();
            s.portfolio_irrs.insert(
                (portfolio_id.to_string(), on),
                PortfolioIrrValue::new(portfolio_id, on, rate),
            );
        }

        fn set_fail_commit(&self, fail: bool) {
            self.state.lock().unwrap().fail_commit = fail;
        }

        fn fund_irr(&self, fund_id: &str, on: NaiveDate) -> Option<Decimal> {
            let s = self.state.lock().unwrap();
            s.fund_irrs.get(&(fund_id.to_string(), on)).map(|v| v.irr)
        }

        fn portfolio_irr(&self, portfolio_id: &str, on: NaiveDate) -> Option<Decimal> {
            let s = self.state.lock().unwrap();
            s.portfolio_irrs
                .get(&(portfolio_id.to_string(), on))
                .map(|v| v.irr)
        }

        fn portfolio_valuation_amount(&self, portfolio_id: &str, on: NaiveDate) -> Option<Decimal> {
            let s = self.state.lock().unwrap();
            s.portfolio_valuations
                .get(&(portfolio_id.to_string(), on))
                .map(|v| v.amount)
        }

        fn has_fund_valuation(&self, valuation_id: &str) -> bool {
            self.state
                .lock()
                .unwrap()
                .fund_valuations
                .contains_key(valuation_id)
        }

        fn write_log(&self) -> Vec<CascadeMutation> {
            self.state.lock().unwrap().write_log.clone()
        }
    }

    impl PortfolioRepositoryTrait for MockStore {
        fn get_portfolio(&self, portfolio_id: &str) -> Result<Option<Portfolio>> {
            Ok(self.state.lock().unwrap().portfolios.get(portfolio_id).cloned())
        }
        fn get_fund(&self, portfolio_fund_id: &str) -> Result<Option<PortfolioFund>> {
            Ok(self.state.lock().unwrap().funds.get(portfolio_fund_id).cloned())
        }
        fn get_funds(&self, portfolio_id: &str) -> Result<Vec<PortfolioFund>> {
            let s = self.state.lock().unwrap();
            Ok(s.funds
                .values()
                .filter(|f| f.portfolio_id == portfolio_id)
                .cloned()
                .collect())
        }
        fn get_active_funds(
            &self,
            portfolio_id: &str,
            as_of: NaiveDate,
        ) -> Result<Vec<PortfolioFund>> {
            let s = self.state.lock().unwrap();
            Ok(s.funds
                .values()
                .filter(|f| f.portfolio_id == portfolio_id && f.is_active_on(as_of))
                .cloned()
                .collect())
        }
    }

    impl ValuationRepositoryTrait for MockStore {
        fn get_fund_valuation(&self, valuation_id: &str) -> Result<Option<FundValuation>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .fund_valuations
                .get(valuation_id)
                .cloned())
        }
        fn find_fund_valuation(
            &self,
            portfolio_fund_id: &str,
            on: NaiveDate,
        ) -> Result<Option<FundValuation>> {
            let s = self.state.lock().unwrap();
            Ok(s.fund_valuations
                .values()
                .find(|v| v.portfolio_fund_id == portfolio_fund_id && v.valuation_date == on)
                .cloned())
        }
        fn get_fund_valuations_on_date(
            &self,
            portfolio_id: &str,
            on: NaiveDate,
        ) -> Result<Vec<FundValuation>> {
            let s = self.state.lock().unwrap();
            Ok(s.fund_valuations
                .values()
                .filter(|v| {
                    v.valuation_date == on
                        && s.funds
                            .get(&v.portfolio_fund_id)
                            .is_some_and(|f| f.portfolio_id == portfolio_id)
                })
                .cloned()
                .collect())
        }
        fn get_latest_valuation_date(&self, portfolio_id: &str) -> Result<Option<NaiveDate>> {
            let s = self.state.lock().unwrap();
            Ok(s.fund_valuations
                .values()
                .filter(|v| {
                    s.funds
                        .get(&v.portfolio_fund_id)
                        .is_some_and(|f| f.portfolio_id == portfolio_id)
                })
                .map(|v| v.valuation_date)
                .max())
        }
        fn get_fund_valuation_dates_from(
            &self,
            portfolio_id: &str,
            from: NaiveDate,
        ) -> Result<Vec<NaiveDate>> {
            let s = self.state.lock().unwrap();
            let dates: BTreeSet<NaiveDate> = s
                .fund_valuations
                .values()
                .filter(|v| {
                    v.valuation_date >= from
                        && s.funds
                            .get(&v.portfolio_fund_id)
                            .is_some_and(|f| f.portfolio_id == portfolio_id)
                })
                .map(|v| v.valuation_date)
                .collect();
            Ok(dates.into_iter().collect())
        }
        fn get_portfolio_valuation(
            &self,
            portfolio_id: &str,
            on: NaiveDate,
        ) -> Result<Option<PortfolioValuation>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .portfolio_valuations
                .get(&(portfolio_id.to_string(), on))
                .cloned())
        }
        fn get_portfolio_valuation_dates_from(
            &self,
            portfolio_id: &str,
            from: NaiveDate,
        ) -> Result<Vec<NaiveDate>> {
            let s = self.state.lock().unwrap();
            let dates: BTreeSet<NaiveDate> = s
                .portfolio_valuations
                .keys()
                .filter(|(pid, d)| pid == portfolio_id && *d >= from)
                .map(|(_, d)| *d)
                .collect();
            Ok(dates.into_iter().collect())
        }
    }

    impl ActivityRepositoryTrait for MockStore {
        fn get_activities_for_fund(
            &self,
            portfolio_fund_id: &str,
            up_to: NaiveDate,
        ) -> Result<Vec<Activity>> {
            let s = self.state.lock().unwrap();
            let mut activities: Vec<Activity> = s
                .activities
                .iter()
                .filter(|a| a.portfolio_fund_id == portfolio_fund_id && a.activity_date <= up_to)
                .cloned()
                .collect();
            activities.sort_by_key(|a| a.activity_date);
            Ok(activities)
        }
        fn get_activities_for_funds(
            &self,
            portfolio_fund_ids: &[String],
            up_to: NaiveDate,
        ) -> Result<Vec<Activity>> {
            let s = self.state.lock().unwrap();
            let mut activities: Vec<Activity> = s
                .activities
                .iter()
                .filter(|a| {
                    portfolio_fund_ids.contains(&a.portfolio_fund_id) && a.activity_date <= up_to
                })
                .cloned()
                .collect();
            activities.sort_by_key(|a| a.activity_date);
            Ok(activities)
        }
    }

    impl IrrRepositoryTrait for MockStore {
        fn get_fund_irr(
            &self,
            portfolio_fund_id: &str,
            on: NaiveDate,
        ) -> Result<Option<FundIrrValue>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .fund_irrs
                .get(&(portfolio_fund_id.to_string(), on))
                .cloned())
        }
        fn get_portfolio_irr(
            &self,
            portfolio_id: &str,
            on: NaiveDate,
        ) -> Result<Option<PortfolioIrrValue>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .portfolio_irrs
                .get(&(portfolio_id.to_string(), on))
                .cloned())
        }
        fn get_irr_dates_from(&self, portfolio_id: &str, from: NaiveDate) -> Result<Vec<NaiveDate>> {
            let s = self.state.lock().unwrap();
            let mut dates: BTreeSet<NaiveDate> = s
                .fund_irrs
                .iter()
                .filter(|((fund_id, d), _)| {
                    *d >= from
                        && s.funds
                            .get(fund_id)
                            .is_some_and(|f| f.portfolio_id == portfolio_id)
                })
                .map(|((_, d), _)| *d)
                .collect();
            dates.extend(
                s.portfolio_irrs
                    .keys()
                    .filter(|(pid, d)| pid == portfolio_id && *d >= from)
                    .map(|(_, d)| *d),
            );
            Ok(dates.into_iter().collect())
        }
    }

    #[async_trait]
    impl CascadeWriteRepositoryTrait for MockStore {
        async fn commit(&self, mutations: Vec<CascadeMutation>) -> Result<()> {
            let mut s = self.state.lock().unwrap();
            if s.fail_commit {
                return Err(Error::Database(DatabaseError::TransactionFailed(
                    "writer unavailable".to_string(),
                )));
            }
            for mutation in &mutations {
                match mutation.clone() {
                    CascadeMutation::SaveFundIrr(irr) => {
                        s.fund_irrs
                            .insert((irr.portfolio_fund_id.clone(), irr.irr_date), irr);
                    }
                    CascadeMutation::DeleteFundIrr {
                        portfolio_fund_id,
                        date,
                    } => {
                        s.fund_irrs.remove(&(portfolio_fund_id, date));
                    }
                    CascadeMutation::DeleteFundValuation { valuation_id } => {
                        s.fund_valuations.remove(&valuation_id);
                    }
                    CascadeMutation::SavePortfolioValuation(valuation) => {
                        s.portfolio_valuations.insert(
                            (valuation.portfolio_id.clone(), valuation.valuation_date),
                            valuation,
                        );
                    }
                    CascadeMutation::DeletePortfolioValuation { portfolio_id, date } => {
                        s.portfolio_valuations.remove(&(portfolio_id, date));
                    }
                    CascadeMutation::SavePortfolioIrr(irr) => {
                        s.portfolio_irrs
                            .insert((irr.portfolio_id.clone(), irr.irr_date), irr);
                    }
                    CascadeMutation::DeletePortfolioIrr { portfolio_id, date } => {
                        s.portfolio_irrs.remove(&(portfolio_id, date));
                    }
                }
            }
            s.write_log.extend(mutations);
            Ok(())
        }
    }

    fn service(store: &MockStore) -> CascadeService {
        let repo = Arc::new(store.clone());
        CascadeService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo,
            Arc::new(XirrCalculator::new()),
        )
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    /// Two funds valued and derived on 2024-01-31, with a year of history.
    fn seed_two_fund_portfolio(store: &MockStore) -> NaiveDate {
        let d = date(2024, 1, 31);
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_fund("fb", "p1", None);
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        store.add_activity("fb", date(2023, 1, 31), dec!(2000), ActivityType::Contribution);
        store.add_fund_valuation("va", "fa", d, dec!(1100));
        store.add_fund_valuation("vb", "fb", d, dec!(2200));
        store.add_fund_irr("fa", d, dec!(0.10));
        store.add_fund_irr("fb", d, dec!(0.10));
        store.add_portfolio_valuation("p1", d, dec!(3300));
        store.add_portfolio_irr("p1", d, dec!(0.10));
        d
    }

    #[tokio::test]
    async fn deleting_a_valuation_cascades_to_portfolio_records() {
        let store = MockStore::default();
        let d = seed_two_fund_portfolio(&store);
        let svc = service(&store);

        let summary = svc.on_fund_valuation_deleted("va").await.unwrap();

        assert!(summary.fund_irr_deleted);
        assert!(summary.fund_valuation_deleted);
        assert!(summary.portfolio_valuation_deleted);
        assert!(summary.portfolio_irr_deleted);

        assert!(!store.has_fund_valuation("va"));
        assert_eq!(store.fund_irr("fa", d), None);
        assert_eq!(store.portfolio_valuation_amount("p1", d), None);
        assert_eq!(store.portfolio_irr("p1", d), None);
        // The sibling fund's records are untouched.
        assert_eq!(store.fund_irr("fb", d), Some(dec!(0.10)));
        assert!(store.has_fund_valuation("vb"));
    }

    #[tokio::test]
    async fn deleting_an_already_deleted_valuation_is_a_no_op() {
        let store = MockStore::default();
        seed_two_fund_portfolio(&store);
        let svc = service(&store);

        svc.on_fund_valuation_deleted("va").await.unwrap();
        let writes_after_first = store.write_log().len();

        let second = svc.on_fund_valuation_deleted("va").await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.write_log().len(), writes_after_first);
    }

    #[tokio::test]
    async fn re_adding_the_valuation_restores_fund_and_portfolio_records() {
        let store = MockStore::default();
        let d = seed_two_fund_portfolio(&store);
        let svc = service(&store);

        svc.on_fund_valuation_deleted("va").await.unwrap();
        store.add_fund_valuation("va2", "fa", d, dec!(1100));

        let report = svc.on_fund_valuation_upserted("fa", d).await.unwrap();

        assert!(report.complete);
        assert_close(report.fund_irr.unwrap(), dec!(0.10), dec!(0.005));
        assert_close(report.portfolio_irr.unwrap(), dec!(0.10), dec!(0.005));
        assert_eq!(store.portfolio_valuation_amount("p1", d), Some(dec!(3300)));
        assert_close(store.fund_irr("fa", d).unwrap(), dec!(0.10), dec!(0.005));
        assert_close(store.portfolio_irr("p1", d).unwrap(), dec!(0.10), dec!(0.005));
    }

    #[tokio::test]
    async fn fund_level_writes_precede_portfolio_level_writes() {
        let store = MockStore::default();
        let d = seed_two_fund_portfolio(&store);
        let svc = service(&store);

        svc.on_fund_valuation_upserted("fa", d).await.unwrap();

        let log = store.write_log();
        let fund_pos = log
            .iter()
            .position(|m| matches!(m, CascadeMutation::SaveFundIrr(_)))
            .expect("fund IRR write missing");
        let valuation_pos = log
            .iter()
            .position(|m| matches!(m, CascadeMutation::SavePortfolioValuation(_)))
            .expect("portfolio valuation write missing");
        let irr_pos = log
            .iter()
            .position(|m| matches!(m, CascadeMutation::SavePortfolioIrr(_)))
            .expect("portfolio IRR write missing");
        assert!(fund_pos < valuation_pos);
        assert!(valuation_pos < irr_pos);
    }

    #[tokio::test]
    async fn upsert_on_incomplete_date_tears_down_stale_portfolio_records() {
        let store = MockStore::default();
        let d = date(2024, 1, 31);
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_fund("fb", "p1", None);
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        store.add_fund_valuation("va", "fa", d, dec!(1100));
        // Stale portfolio records from before fb joined.
        store.add_portfolio_valuation("p1", d, dec!(1100));
        store.add_portfolio_irr("p1", d, dec!(0.10));
        let svc = service(&store);

        let report = svc.on_fund_valuation_upserted("fa", d).await.unwrap();

        assert!(!report.complete);
        assert!(report.fund_irr.is_some());
        assert_eq!(report.portfolio_irr, None);
        assert_eq!(store.portfolio_valuation_amount("p1", d), None);
        assert_eq!(store.portfolio_irr("p1", d), None);
    }

    #[tokio::test]
    async fn ended_funds_do_not_block_portfolio_recomputation() {
        let store = MockStore::default();
        let d = date(2024, 1, 31);
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_fund("fended", "p1", Some(date(2023, 6, 30)));
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        store.add_fund_valuation("va", "fa", d, dec!(1100));
        let svc = service(&store);

        let report = svc.on_fund_valuation_upserted("fa", d).await.unwrap();

        assert!(report.complete);
        // Only the live fund contributes to the aggregate.
        assert_eq!(store.portfolio_valuation_amount("p1", d), Some(dec!(1100)));
    }

    #[tokio::test]
    async fn insufficient_history_records_absence_instead_of_failing() {
        let store = MockStore::default();
        let d = date(2024, 1, 31);
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        // Valuation but no cash flows at all, plus a stale IRR to clear.
        store.add_fund_valuation("va", "fa", d, dec!(1100));
        store.add_fund_irr("fa", d, dec!(0.07));
        let svc = service(&store);

        let report = svc.on_fund_valuation_upserted("fa", d).await.unwrap();

        assert_eq!(report.fund_irr, None);
        assert_eq!(store.fund_irr("fa", d), None);
    }

    #[tokio::test]
    async fn upsert_on_a_past_date_propagates_forward() {
        let store = MockStore::default();
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        let mid = date(2023, 6, 30);
        let latest = date(2024, 1, 31);
        store.add_fund_valuation("v-mid", "fa", mid, dec!(1040));
        store.add_fund_valuation("v-latest", "fa", latest, dec!(1100));
        store.add_fund_irr("fa", mid, dec!(0.08));
        store.add_fund_irr("fa", latest, dec!(0.10));
        let svc = service(&store);

        let report = svc.on_fund_valuation_upserted("fa", mid).await.unwrap();

        let propagation = report.propagation.expect("expected forward propagation");
        let revisited: Vec<NaiveDate> = propagation.outcomes.iter().map(|(d, _)| *d).collect();
        assert_eq!(revisited, vec![latest]);
        // The later fund IRR was rewritten by the propagation.
        let log = store.write_log();
        assert!(log.iter().any(|m| matches!(
            m,
            CascadeMutation::SaveFundIrr(irr) if irr.irr_date == latest
        )));
    }

    #[tokio::test]
    async fn upsert_on_the_latest_date_does_not_propagate() {
        let store = MockStore::default();
        let d = seed_two_fund_portfolio(&store);
        let svc = service(&store);

        let report = svc.on_fund_valuation_upserted("fa", d).await.unwrap();
        assert!(report.propagation.is_none());
    }

    #[tokio::test]
    async fn activity_edit_recomputes_forward_window_only() {
        let store = MockStore::default();
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        let dates = [
            date(2023, 3, 31),
            date(2023, 6, 30),
            date(2023, 9, 30),
            date(2024, 1, 31),
        ];
        for (i, d) in dates.iter().enumerate() {
            store.add_fund_valuation(&format!("v{}", i), "fa", *d, dec!(1000) + Decimal::from(i));
            store.add_fund_irr("fa", *d, dec!(0.042));
            store.add_portfolio_valuation("p1", *d, dec!(1000) + Decimal::from(i));
            store.add_portfolio_irr("p1", *d, dec!(0.042));
        }
        // The edited activity itself, dated between the first and second valuation.
        store.add_activity("fa", date(2023, 6, 15), dec!(50), ActivityType::Withdrawal);
        let svc = service(&store);

        let report = svc
            .on_activities_changed("p1", &[date(2023, 6, 15)])
            .await
            .unwrap();

        let revisited: Vec<NaiveDate> = report.outcomes.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            revisited,
            vec![date(2023, 6, 30), date(2023, 9, 30), date(2024, 1, 31)]
        );
        // Ascending order is part of the contract.
        let mut sorted = revisited.clone();
        sorted.sort();
        assert_eq!(revisited, sorted);

        // The date before the edit window still carries its original figures.
        assert_eq!(store.fund_irr("fa", date(2023, 3, 31)), Some(dec!(0.042)));
        assert_eq!(store.portfolio_irr("p1", date(2023, 3, 31)), Some(dec!(0.042)));
        // Dates inside the window were rewritten.
        assert_ne!(store.fund_irr("fa", date(2023, 6, 30)), Some(dec!(0.042)));
        assert_ne!(store.fund_irr("fa", date(2024, 1, 31)), Some(dec!(0.042)));
        // No mutation touched anything dated before the window.
        for mutation in store.write_log() {
            let touched = match &mutation {
                CascadeMutation::SaveFundIrr(irr) => irr.irr_date,
                CascadeMutation::DeleteFundIrr { date, .. } => *date,
                CascadeMutation::DeleteFundValuation { .. } => continue,
                CascadeMutation::SavePortfolioValuation(v) => v.valuation_date,
                CascadeMutation::DeletePortfolioValuation { date, .. } => *date,
                CascadeMutation::SavePortfolioIrr(irr) => irr.irr_date,
                CascadeMutation::DeletePortfolioIrr { date, .. } => *date,
            };
            assert!(touched >= date(2023, 6, 15), "touched {}", touched);
        }
    }

    #[tokio::test]
    async fn activity_batch_without_dates_is_rejected() {
        let store = MockStore::default();
        store.add_portfolio("p1");
        let svc = service(&store);

        let result = svc.on_activities_changed("p1", &[]).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_identifiers_surface_not_found() {
        let store = MockStore::default();
        store.add_portfolio("p1");
        let svc = service(&store);

        let upsert = svc
            .on_fund_valuation_upserted("missing", date(2024, 1, 31))
            .await;
        assert!(matches!(upsert, Err(Error::NotFound(_))));

        let edit = svc.on_historical_edit("nope", date(2024, 1, 31)).await;
        assert!(matches!(edit, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn commit_failure_surfaces_and_leaves_state_untouched() {
        let store = MockStore::default();
        let d = seed_two_fund_portfolio(&store);
        store.set_fail_commit(true);
        let svc = service(&store);

        let result = svc.on_fund_valuation_deleted("va").await;
        assert!(matches!(result, Err(Error::Database(_))));
        // Nothing was applied: the valuation and all derived records survive.
        assert!(store.has_fund_valuation("va"));
        assert_eq!(store.fund_irr("fa", d), Some(dec!(0.10)));
        assert_eq!(store.portfolio_irr("p1", d), Some(dec!(0.10)));
    }

    #[tokio::test]
    async fn historical_edit_rebuilds_portfolio_records_when_complete() {
        let store = MockStore::default();
        store.add_portfolio("p1");
        store.add_fund("fa", "p1", None);
        store.add_activity("fa", date(2023, 1, 31), dec!(1000), ActivityType::Contribution);
        let d = date(2024, 1, 31);
        store.add_fund_valuation("va", "fa", d, dec!(1100));
        // No derived records yet: the propagator builds them from scratch.
        let svc = service(&store);

        let report = svc.on_historical_edit("p1", date(2023, 1, 1)).await.unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(store.portfolio_valuation_amount("p1", d), Some(dec!(1100)));
        assert!(store.fund_irr("fa", d).is_some());
        assert!(store.portfolio_irr("p1", d).is_some());
    }
}
